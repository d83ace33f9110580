// IBAN / BIC Service - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod iban;       // Validation: structure + MOD 97-10
pub mod reference;  // Bank code reference table loader
pub mod resolver;   // German IBAN → bank code → BankRecord
pub mod engine;     // Validate-then-resolve flow shared by all transports
pub mod config;     // Server configuration (environment)

#[cfg(feature = "server")]
pub mod api;        // HTTP routes (axum)

// Re-export commonly used types
pub use iban::{check, normalize, validate, IbanError};
pub use reference::{
    BankRecord, ReferenceTable, LoadOutcome, LoadError,
    load_reference_table, parse_reference_table,
};
pub use resolver::{bank_code, resolve, BankCodeLayout, GERMANY};
pub use engine::{inspect, IbanReport};
pub use config::{ServerConfig, ConfigError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
