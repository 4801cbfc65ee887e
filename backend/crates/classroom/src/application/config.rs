//! Application Configuration
//!
//! Configuration for the Classroom application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::PasswordHasher;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
pub use platform::password::PasswordParams;

/// How long the "Account created" style notices survive if never shown
const NOTICE_MAX_AGE_SECS: u64 = 60;

/// Classroom application configuration
#[derive(Clone)]
pub struct ClassroomConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// `None` keeps sessions non-permanent: no Max-Age, no server expiry
    pub session_lifetime: Option<Duration>,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Cookie carrying one-shot notices between a redirect and the next page
    pub notice_cookie_name: String,
    /// Password digest producer, with its Argon2 cost parameters
    pub password_hasher: PasswordHasher,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "classroom_session".to_string(),
            session_secret: [0u8; 32],
            session_lifetime: None,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            notice_cookie_name: "classroom_notice".to_string(),
            password_hasher: PasswordHasher::default(),
        }
    }
}

impl fmt::Debug for ClassroomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassroomConfig")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_secret", &"[REDACTED]")
            .field("session_lifetime", &self.session_lifetime)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("notice_cookie_name", &self.notice_cookie_name)
            .field("password_params", &self.password_hasher.params())
            .finish()
    }
}

impl ClassroomConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Session lifetime as a chrono duration, for expiry timestamps
    pub fn session_lifetime_chrono(&self) -> Option<chrono::Duration> {
        self.session_lifetime
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
    }

    /// Attributes of the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            max_age_secs: self.session_lifetime.map(|ttl| ttl.as_secs()),
            ..CookieConfig::named(&self.session_cookie_name)
        }
    }

    /// Attributes of the notice cookie
    pub fn notice_cookie(&self) -> CookieConfig {
        CookieConfig {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            max_age_secs: Some(NOTICE_MAX_AGE_SECS),
            ..CookieConfig::named(&self.notice_cookie_name)
        }
    }
}
