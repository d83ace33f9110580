// 🏦 Reference Table - Bankleitzahl → BIC
// One-shot loader for the Bundesbank bank code export
//
// Dataset layout (semicolon separated, header row first):
//   0: Bankleitzahl  2: Bezeichnung  4: Ort  7: BIC
//
// Loaded once at startup, never mutated afterwards. A missing or broken file
// yields an EMPTY table, not a crash: IBAN validation keeps working, BIC
// enrichment just never finds anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum number of fields a data row needs (BIC lives at index 7)
const MIN_FIELDS: usize = 8;

const FIELD_BANK_CODE: usize = 0;
const FIELD_NAME: usize = 2;
const FIELD_CITY: usize = 4;
const FIELD_BIC: usize = 7;

// ============================================================================
// BANK RECORD
// ============================================================================

/// One bank from the reference dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Bankleitzahl (8 digits for Germany) - unique key
    pub bank_code: String,

    /// Business Identifier Code (SWIFT)
    pub bic: String,

    /// Bezeichnung
    pub name: String,

    /// Ort
    pub city: String,
}

impl BankRecord {
    pub fn new(bank_code: &str, bic: &str, name: &str, city: &str) -> Self {
        BankRecord {
            bank_code: bank_code.to_string(),
            bic: bic.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        }
    }
}

// ============================================================================
// REFERENCE TABLE
// ============================================================================

/// Immutable bank code → record mapping
///
/// No interior mutability: once built it can be shared across threads
/// (`Arc<ReferenceTable>`) without locking.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    records: HashMap<String, BankRecord>,
    loaded_at: DateTime<Utc>,
}

impl ReferenceTable {
    /// Table with no records (the degraded state after a failed load)
    pub fn empty() -> Self {
        ReferenceTable {
            records: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Build a table from records; a later record replaces an earlier one
    /// with the same bank code
    ///
    /// Records whose bank code is empty or not all digits are dropped, as
    /// the loader does.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = BankRecord>,
    {
        let mut table = ReferenceTable::empty();
        for record in records {
            if !is_bank_code(&record.bank_code) {
                tracing::debug!(bank_code = %record.bank_code, "dropping record without numeric bank code");
                continue;
            }
            table.records.insert(record.bank_code.clone(), record);
        }
        table
    }

    /// Exact-match lookup by bank code
    pub fn get(&self, bank_code: &str) -> Option<&BankRecord> {
        self.records.get(bank_code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When this table was built
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn iter(&self) -> impl Iterator<Item = &BankRecord> {
        self.records.values()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<BankRecord> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = BankRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

/// Table keys are non-empty ASCII digit strings
fn is_bank_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// LOAD OUTCOME
// ============================================================================

/// Why a dataset could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open reference dataset {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed reference dataset: {0}")]
    Parse(#[from] csv::Error),
}

/// Result of the one-time load
///
/// Not a `Result`: an unusable dataset is an expected, survivable outcome.
/// The caller decides whether `Empty` is worth a warning.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ReferenceTable),
    Empty(LoadError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    /// The failure reason, if the dataset could not be used
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Empty(err) => Some(err),
        }
    }

    /// The table to serve from: the loaded one, or an empty one
    pub fn into_table(self) -> ReferenceTable {
        match self {
            LoadOutcome::Loaded(table) => table,
            LoadOutcome::Empty(_) => ReferenceTable::empty(),
        }
    }
}

// ============================================================================
// LOADER
// ============================================================================

/// Load the reference dataset from a file
///
/// # Example:
/// ```no_run
/// use iban_bic::reference::load_reference_table;
///
/// let table = load_reference_table("blz-aktuell-csv-data.csv").into_table();
/// println!("{} banks", table.len());
/// ```
pub fn load_reference_table<P: AsRef<Path>>(path: P) -> LoadOutcome {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            return LoadOutcome::Empty(LoadError::Open {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match parse_reference_table(file) {
        Ok(table) => {
            tracing::info!(
                path = %path.display(),
                banks = table.len(),
                "reference table loaded"
            );
            LoadOutcome::Loaded(table)
        }
        Err(err) => LoadOutcome::Empty(err),
    }
}

/// Parse a dataset from any reader
///
/// Any CSV error (bad quoting, invalid UTF-8, I/O) fails the whole parse;
/// a half-built table is never returned.
pub fn parse_reference_table<R: Read>(reader: R) -> Result<ReferenceTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = HashMap::new();

    for (row_num, result) in rdr.records().enumerate() {
        let row = result?;
        let line = row_num + 2; // 1-indexed + header row

        if row.len() < MIN_FIELDS {
            tracing::debug!(line, fields = row.len(), "skipping short row");
            continue;
        }

        let field = |idx: usize| row.get(idx).unwrap_or("").trim_matches('"').to_string();

        let bank_code = field(FIELD_BANK_CODE);
        if !is_bank_code(&bank_code) {
            tracing::debug!(line, bank_code = %bank_code, "skipping row without numeric bank code");
            continue;
        }

        let record = BankRecord {
            bank_code: bank_code.clone(),
            bic: field(FIELD_BIC),
            name: field(FIELD_NAME),
            city: field(FIELD_CITY),
        };

        // Last row wins on duplicate bank codes
        records.insert(bank_code, record);
    }

    Ok(ReferenceTable {
        records,
        loaded_at: Utc::now(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
