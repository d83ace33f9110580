// ⚙️ IBAN Engine - validate, then enrich
//
// The flow every transport uses: validate the IBAN and, only if it passes,
// look up the bank behind it.

use crate::iban::{check, IbanError};
use crate::reference::{BankRecord, ReferenceTable};
use crate::resolver::resolve;
use serde::{Deserialize, Serialize};

/// Outcome of inspecting one IBAN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanReport {
    /// Input exactly as received
    pub iban: String,

    pub is_valid: bool,

    /// Bank behind the IBAN; only set for valid German IBANs with a known code
    pub bank: Option<BankRecord>,

    /// Rejection reason for invalid IBANs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IbanReport {
    pub fn bank_found(&self) -> bool {
        self.bank.is_some()
    }
}

/// Validate an IBAN and resolve its bank against `table`
///
/// The table is never consulted for invalid IBANs.
pub fn inspect(raw: &str, table: &ReferenceTable) -> IbanReport {
    match check(raw) {
        Ok(normalized) => IbanReport {
            iban: raw.to_string(),
            is_valid: true,
            bank: resolve(&normalized, table).cloned(),
            error: None,
        },
        Err(err) => rejected(raw, &err),
    }
}

fn rejected(raw: &str, err: &IbanError) -> IbanReport {
    IbanReport {
        iban: raw.to_string(),
        is_valid: false,
        bank: None,
        error: Some(err.to_string()),
    }
}
