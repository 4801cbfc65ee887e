//! One-shot notices shown on the page after a redirect

/// Informational notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    AccountCreated,
}

impl Notice {
    /// Stable code carried in the notice cookie
    pub fn code(&self) -> &'static str {
        match self {
            Notice::AccountCreated => "account_created",
        }
    }

    /// Text shown to the player
    pub fn message(&self) -> &'static str {
        match self {
            Notice::AccountCreated => "Account created",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "account_created" => Some(Notice::AccountCreated),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        let notice = Notice::AccountCreated;
        assert_eq!(Notice::from_code(notice.code()), Some(notice));
        assert_eq!(notice.message(), "Account created");
        assert_eq!(Notice::from_code("<script>"), None);
    }
}
