//! Administrator password policy.
//!
//! The directory toolkit rejects some passwords late and unhelpfully, so the
//! dialog flow enforces the policy up front: minimum length, a complexity
//! score, and no parentheses (Samba chokes on them in provisioning).

/// Minimum password length accepted by the dialogs.
pub const MIN_LENGTH: usize = 8;

/// Minimum complexity score (out of 4) accepted by the dialogs.
pub const MIN_COMPLEXITY: u8 = 3;

/// Password complexity score from 0 (invalid) to 4 (strong).
///
/// One point per character class present: lowercase, uppercase, digit,
/// non-alphanumeric.
pub fn complexity(password: &str) -> u8 {
    let lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let nonalpha = password.chars().any(|c| !c.is_alphanumeric());

    [lowercase, uppercase, digit, nonalpha]
        .iter()
        .filter(|&&present| present)
        .count() as u8
}

/// Why a candidate password was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    Empty,
    TooShort,
    TooWeak,
    Parentheses,
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Please enter a non-empty password."),
            Self::TooShort => {
                write!(f, "Password must be at least {} characters.", MIN_LENGTH)
            }
            Self::TooWeak => write!(
                f,
                "Insecure password! Mix uppercase, lowercase, and at least one number. \
                 Multiple words and punctuation are highly recommended."
            ),
            Self::Parentheses => write!(
                f,
                "Please do not use parentheses in a password, as it breaks Samba."
            ),
        }
    }
}

/// Check a candidate password against the first-boot policy.
pub fn check(password: &str) -> std::result::Result<(), PolicyViolation> {
    if password.is_empty() {
        return Err(PolicyViolation::Empty);
    }
    if password.len() < MIN_LENGTH {
        return Err(PolicyViolation::TooShort);
    }
    if complexity(password) < MIN_COMPLEXITY {
        return Err(PolicyViolation::TooWeak);
    }
    if password.contains(['(', ')']) {
        return Err(PolicyViolation::Parentheses);
    }
    Ok(())
}
