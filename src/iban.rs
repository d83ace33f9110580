// ✅ IBAN Validation - ISO 7064 MOD 97-10
// Structural checks + checksum over the rearranged alphanumeric form
//
// "DE89 3704 0044 0532 0130 00"
//   → normalize  → "DE89370400440532013000"
//   → rearrange  → "370400440532013000" + "DE89"
//   → expand     → "370400440532013000131489"
//   → mod 97     → 1 ✓

use thiserror::Error;

/// Shortest IBAN in use (Norway)
pub const MIN_LENGTH: usize = 15;

/// Longest IBAN allowed by ISO 13616
pub const MAX_LENGTH: usize = 34;

// ============================================================================
// ERRORS
// ============================================================================

/// Why an IBAN was rejected
///
/// `validate()` collapses all of these into `false`; `check()` keeps the reason
/// for callers that want to show it (CLI, logs).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IbanError {
    #[error("length {0} is outside 15..=34")]
    Length(usize),

    #[error("country code must be two letters")]
    CountryCode,

    #[error("check digits must be numeric")]
    CheckDigits,

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("checksum mismatch (remainder {0}, expected 1)")]
    Checksum(u32),
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Remove spaces and upper-case
///
/// Only ASCII letters are upper-cased. Anything outside ASCII is left as-is and
/// rejected later as an invalid character.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Move the country code and check digits to the end
fn rearrange(normalized: &str) -> String {
    let (head, tail) = normalized.split_at(4);
    format!("{}{}", tail, head)
}

/// Transliterate to a decimal digit string (A=10 … Z=35, digits unchanged)
pub fn numeric_expansion(rearranged: &str) -> Result<String, IbanError> {
    let mut digits = String::with_capacity(rearranged.len() * 2);

    for c in rearranged.chars() {
        if c.is_ascii_uppercase() {
            let value = c as u32 - 'A' as u32 + 10;
            digits.push_str(&value.to_string());
        } else if c.is_ascii_digit() {
            digits.push(c);
        } else {
            return Err(IbanError::InvalidCharacter(c));
        }
    }

    Ok(digits)
}

/// Decimal string modulo 97, one digit at a time
///
/// The expanded form of a 34-character IBAN is up to 68 digits, far beyond
/// u128, so the value is never materialized.
pub fn mod97(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0, |remainder, d| (remainder * 10 + u32::from(d - b'0')) % 97)
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate an IBAN and return its normalized form
///
/// # Example:
/// ```
/// use iban_bic::iban::check;
///
/// assert_eq!(check("de89 3704 0044 0532 0130 00").unwrap(), "DE89370400440532013000");
/// assert!(check("DE89370400440532013001").is_err());
/// ```
pub fn check(raw: &str) -> Result<String, IbanError> {
    let iban = normalize(raw);
    let bytes = iban.as_bytes();

    if bytes.len() < MIN_LENGTH || bytes.len() > MAX_LENGTH {
        return Err(IbanError::Length(bytes.len()));
    }

    if !bytes[0].is_ascii_uppercase() || !bytes[1].is_ascii_uppercase() {
        return Err(IbanError::CountryCode);
    }

    if !bytes[2].is_ascii_digit() || !bytes[3].is_ascii_digit() {
        return Err(IbanError::CheckDigits);
    }

    // First four bytes are ASCII at this point, so the split is on a char boundary
    let digits = numeric_expansion(&rearrange(&iban))?;

    match mod97(&digits) {
        1 => Ok(iban),
        remainder => Err(IbanError::Checksum(remainder)),
    }
}

/// Validate an IBAN (structure + MOD 97-10 checksum)
pub fn validate(raw: &str) -> bool {
    check(raw).is_ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DE: &str = "DE89370400440532013000";

    #[test]
    fn test_valid_german_iban() {
        assert!(validate(VALID_DE));
    }

    #[test]
    fn test_perturbed_last_digit_fails_checksum() {
        assert!(!validate("DE89370400440532013001"));
        assert!(matches!(
            check("DE89370400440532013001"),
            Err(IbanError::Checksum(_))
        ));
    }

    #[test]
    fn test_valid_ibans_from_other_countries() {
        // Shortest (NO, 15) and a few common layouts
        assert!(validate("NO9386011117947"));
        assert!(validate("GB29NWBK60161331926819"));
        assert!(validate("FR1420041010050500013M02606"));
        assert!(validate("CH9300762011623852957"));
    }

    #[test]
    fn test_length_boundaries() {
        // 14 and 35 are rejected before any checksum work
        assert_eq!(check("NO938601111794"), Err(IbanError::Length(14)));
        let too_long = format!("DE89{}", "1".repeat(31));
        assert_eq!(too_long.len(), 35);
        assert_eq!(check(&too_long), Err(IbanError::Length(35)));
    }

    #[test]
    fn test_length_15_and_34_run_full_algorithm() {
        // Well-formed but wrong check digits → checksum error, not length error
        assert!(matches!(check("NO9486011117947"), Err(IbanError::Checksum(_))));

        let thirty_four = format!("DE00{}", "1".repeat(30));
        assert_eq!(thirty_four.len(), 34);
        assert!(matches!(check(&thirty_four), Err(IbanError::Checksum(_))));
    }

    #[test]
    fn test_case_and_space_insensitive() {
        assert_eq!(
            validate("de89 3704 0044 0532 0130 00"),
            validate(VALID_DE)
        );
        assert!(validate("  DE89 3704 0044 0532 0130 00  "));
    }

    #[test]
    fn test_invalid_character_rejected() {
        assert_eq!(
            check("DE89-3704-0044-0532-0130-00"),
            Err(IbanError::InvalidCharacter('-'))
        );
        assert!(!validate("DE89370400440532013ä00"));
    }

    #[test]
    fn test_structural_prefix() {
        assert_eq!(check("1E89370400440532013000"), Err(IbanError::CountryCode));
        assert_eq!(check("DEX9370400440532013000"), Err(IbanError::CheckDigits));
    }

    #[test]
    fn test_only_spaces_are_stripped() {
        // Tabs are not whitespace for IBAN purposes
        assert!(!validate("DE89\t370400440532013000"));
    }

    #[test]
    fn test_numeric_expansion() {
        assert_eq!(numeric_expansion("DE89").unwrap(), "131489");
        assert_eq!(numeric_expansion("AZ").unwrap(), "1035");
        assert_eq!(numeric_expansion("a"), Err(IbanError::InvalidCharacter('a')));
    }

    #[test]
    fn test_mod97_digit_by_digit() {
        assert_eq!(mod97("97"), 0);
        assert_eq!(mod97("98"), 1);
        assert_eq!(mod97("370400440532013000131489"), 1);
    }

    #[test]
    fn test_idempotent() {
        for _ in 0..3 {
            assert!(validate(VALID_DE));
            assert!(!validate("DE89370400440532013001"));
        }
    }
}
