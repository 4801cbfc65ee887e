//! Player Password Value Object
//!
//! Domain wrapper around `platform::password` for form input.

use platform::password::ClearTextPassword;
use std::fmt;

pub use platform::password::HashedPassword;

/// Password from a form field
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Absent and empty both count as missing.
    pub fn from_input(raw: Option<String>) -> Option<Self> {
        raw.filter(|s| !s.is_empty())
            .map(|s| Self(ClearTextPassword::new(s)))
    }

    /// Constant-time equality, used for the confirmation field
    pub fn matches(&self, other: &RawPassword) -> bool {
        self.0.ct_eq(&other.0)
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> RawPassword {
        RawPassword::from_input(Some(s.to_string())).unwrap()
    }

    #[test]
    fn test_missing_and_empty_are_rejected() {
        assert!(RawPassword::from_input(None).is_none());
        assert!(RawPassword::from_input(Some(String::new())).is_none());
    }

    #[test]
    fn test_whitespace_is_a_password() {
        assert!(RawPassword::from_input(Some(" ".to_string())).is_some());
    }

    #[test]
    fn test_matches() {
        assert!(raw("pw123").matches(&raw("pw123")));
        assert!(!raw("pw123").matches(&raw("pw456")));
    }

    #[test]
    fn test_debug_redaction() {
        let output = format!("{:?}", raw("hunter2"));
        assert!(!output.contains("hunter2"));
    }
}
