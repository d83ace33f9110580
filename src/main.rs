use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use iban_bic::config::{DEFAULT_DATA_PATH, ENV_DATA_PATH};
use iban_bic::{check, inspect, load_reference_table, LoadOutcome, ReferenceTable};

#[derive(Parser)]
#[command(name = "iban-bic", version, about = "Validate IBANs and look up German BICs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate one or more IBANs (exit code 1 if any is invalid)
    Validate {
        #[arg(required = true)]
        ibans: Vec<String>,
    },
    /// Validate an IBAN and look up its bank
    Lookup {
        iban: String,
        /// Bundesbank bank code dataset (semicolon separated)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Show how many banks the reference dataset contains
    Stats {
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { ibans } => Ok(run_validate(&ibans)),
        Command::Lookup { iban, data } => {
            run_lookup(&iban, &data_path(data));
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats { data } => Ok(run_stats(&data_path(data))),
    }
}

/// --data, then $BLZ_DATA_PATH, then the default file name
fn data_path(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os(ENV_DATA_PATH).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn run_validate(ibans: &[String]) -> ExitCode {
    let mut all_valid = true;

    for iban in ibans {
        match check(iban) {
            Ok(normalized) => println!("✓ {}", normalized),
            Err(e) => {
                println!("✗ {} ({})", iban, e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_or_warn(path: &Path) -> ReferenceTable {
    let outcome = load_reference_table(path);
    if let Some(e) = outcome.error() {
        eprintln!("⚠️  {} - bank lookup disabled", e);
    }
    outcome.into_table()
}

fn run_lookup(iban: &str, path: &Path) {
    let table = load_or_warn(path);
    let report = inspect(iban, &table);

    if !report.is_valid {
        println!("✗ {} is not a valid IBAN ({})", iban, report.error.unwrap_or_default());
        return;
    }

    match report.bank {
        Some(bank) => {
            println!("✓ {}", iban);
            println!("  BIC:   {}", bank.bic);
            println!("  Bank:  {}", bank.name);
            println!("  City:  {}", bank.city);
            println!("  BLZ:   {}", bank.bank_code);
        }
        None => println!("✓ {} is valid, bank not found", iban),
    }
}

fn run_stats(path: &Path) -> ExitCode {
    match load_reference_table(path) {
        LoadOutcome::Loaded(table) => {
            println!("📂 {}", path.display());
            println!("✓ {} banks (loaded {})", table.len(), table.loaded_at().to_rfc3339());
            ExitCode::SUCCESS
        }
        LoadOutcome::Empty(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
