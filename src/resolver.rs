// 🔎 BIC Resolver - IBAN → bank code → BankRecord
//
// Only shape is checked here, never the checksum. Callers that care (the HTTP
// handler does) validate first.

use crate::iban::normalize;
use crate::reference::{BankRecord, ReferenceTable};

// ============================================================================
// BANK CODE LAYOUT
// ============================================================================

/// Where a country embeds its bank code inside the IBAN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankCodeLayout {
    /// ISO 3166-1 alpha-2 prefix
    pub country: &'static str,

    /// Total IBAN length for this country
    pub length: usize,

    /// Offset of the bank code within the normalized IBAN
    pub offset: usize,

    /// Width of the bank code
    pub width: usize,
}

/// DE + 2 check digits + 8-digit Bankleitzahl + 10-digit account number
pub const GERMANY: BankCodeLayout = BankCodeLayout {
    country: "DE",
    length: 22,
    offset: 4,
    width: 8,
};

impl BankCodeLayout {
    /// Does a normalized IBAN have this country's shape?
    pub fn matches(&self, normalized: &str) -> bool {
        normalized.starts_with(self.country) && normalized.len() == self.length
    }

    /// Extract the bank code from a normalized IBAN, if the shape matches
    pub fn bank_code<'a>(&self, normalized: &'a str) -> Option<&'a str> {
        if !self.matches(normalized) {
            return None;
        }
        // get() instead of slicing: non-ASCII input must not panic
        normalized.get(self.offset..self.offset + self.width)
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Bank code of a German IBAN (spaces and case ignored)
///
/// # Example:
/// ```
/// use iban_bic::resolver::bank_code;
///
/// assert_eq!(bank_code("DE89 3704 0044 0532 0130 00").as_deref(), Some("37040044"));
/// assert_eq!(bank_code("AT611904300234573201"), None);
/// ```
pub fn bank_code(raw: &str) -> Option<String> {
    let normalized = normalize(raw);
    GERMANY.bank_code(&normalized).map(str::to_string)
}

/// Look up the bank behind a German IBAN
///
/// Returns `None` both for IBANs outside the German layout and for bank codes
/// missing from the table.
pub fn resolve<'t>(raw: &str, table: &'t ReferenceTable) -> Option<&'t BankRecord> {
    let normalized = normalize(raw);
    let code = GERMANY.bank_code(&normalized)?;
    table.get(code)
}

// ============================================================================
// TESTS
// ============================================================================
