//! Password Hashing and Verification
//!
//! Salted, memory-hard password digests with:
//! - Argon2id hashing in PHC string format
//! - Tunable cost parameters (memory, iterations, parallelism)
//! - Verification of legacy Werkzeug PBKDF2 digests
//! - Zeroization of clear text
//! - Constant-time comparison
//!
//! ## Security Features
//! - Fresh random salt per digest, so equal passwords never share a digest
//! - Clear text is hashed byte for byte as typed, without normalization
//! - Dummy verification for unknown accounts to equalize timing

use std::fmt;
use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use sha2::{Sha256, Sha512};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::constant_time_eq;

/// Clear text used to burn time when there is no stored digest to check.
const DUMMY_PASSWORD: &str = "classroom-dummy-password";

// ============================================================================
// Error Types
// ============================================================================

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Cost parameters rejected by Argon2
    #[error("Invalid password hashing parameters: {0}")]
    InvalidParams(String),

    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Cost Parameters
// ============================================================================

/// Argon2id cost parameters
///
/// Defaults follow the OWASP recommendation (19 MiB, 2 passes, 1 lane).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordParams {
    /// Cheapest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(8),
            iterations: 1,
            parallelism: 1,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap a password from user input, unchanged.
    ///
    /// No strength policy is enforced here; callers decide what counts as
    /// missing input.
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Compare two clear texts without short-circuiting on the first
    /// differing byte.
    pub fn ct_eq(&self, other: &ClearTextPassword) -> bool {
        constant_time_eq(self.as_bytes(), other.as_bytes())
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries the algorithm, version, cost parameters and salt,
/// so verification does not depend on the currently configured parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Wrap a stored digest without checking its format
    ///
    /// Accepts PHC strings and Werkzeug `pbkdf2:` digests. Anything else
    /// never verifies.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Whether [`PasswordHasher::verify`] understands this digest
    pub fn is_supported(&self) -> bool {
        PasswordHash::new(&self.hash).is_ok() || WerkzeugPbkdf2::parse(&self.hash).is_some()
    }

    /// Digest written by the Werkzeug-based predecessor of this service
    pub fn is_legacy(&self) -> bool {
        WerkzeugPbkdf2::parse(&self.hash).is_some()
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Legacy Digests
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Pbkdf2Prf {
    Sha256,
    Sha512,
}

/// `pbkdf2:<sha256|sha512>:<iterations>$<salt>$<hex digest>`
///
/// The salt is used as its ASCII bytes. A digest without an explicit
/// iteration count is not accepted.
struct WerkzeugPbkdf2<'a> {
    prf: Pbkdf2Prf,
    iterations: u32,
    salt: &'a str,
    expected: Vec<u8>,
}

impl<'a> WerkzeugPbkdf2<'a> {
    fn parse(digest: &'a str) -> Option<Self> {
        let (method, rest) = digest.split_once('$')?;
        let (salt, hex_digest) = rest.split_once('$')?;

        let mut method = method.split(':');
        if method.next()? != "pbkdf2" {
            return None;
        }
        let prf = match method.next()? {
            "sha256" => Pbkdf2Prf::Sha256,
            "sha512" => Pbkdf2Prf::Sha512,
            _ => return None,
        };
        let iterations = method.next()?.parse().ok().filter(|n| *n > 0)?;
        if method.next().is_some() || salt.is_empty() {
            return None;
        }

        let expected = hex::decode(hex_digest).ok().filter(|e| !e.is_empty())?;

        Some(Self {
            prf,
            iterations,
            salt,
            expected,
        })
    }

    fn verify(&self, password: &[u8]) -> bool {
        let mut derived = vec![0u8; self.expected.len()];
        let salt = self.salt.as_bytes();
        match self.prf {
            Pbkdf2Prf::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, self.iterations, &mut derived),
            Pbkdf2Prf::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, self.iterations, &mut derived),
        }
        let matches = constant_time_eq(&derived, &self.expected);
        derived.zeroize();
        matches
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Produces and checks password digests with a fixed set of cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: PasswordParams,
}

impl PasswordHasher {
    /// Fails if Argon2 rejects the parameters.
    pub fn new(params: PasswordParams) -> Result<Self, PasswordHashError> {
        params.argon2()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> PasswordParams {
        self.params
    }

    /// Hash with a fresh 128-bit random salt.
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);
        let hash = self
            .params
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Verify a password against a stored digest
    ///
    /// The recomputed output is compared in constant time. A digest that
    /// cannot be parsed never verifies.
    pub fn verify(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        if let Some(legacy) = WerkzeugPbkdf2::parse(&hashed.hash) {
            return legacy.verify(password.as_bytes());
        }

        let Ok(parsed) = PasswordHash::new(&hashed.hash) else {
            return false;
        };

        // Parameters come from the PHC string, not from `self.params`
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend roughly the cost of one verification and return `false`.
    ///
    /// Used when the account does not exist, so "unknown user" and "wrong
    /// password" cannot be told apart by response time.
    pub fn verify_dummy(&self, password: &ClearTextPassword) -> bool {
        static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();

        let dummy = DUMMY.get_or_init(|| {
            self.hash(&ClearTextPassword::new(DUMMY_PASSWORD.to_string()))
                .ok()
        });

        if let Some(dummy) = dummy {
            let _ = self.verify(password, dummy);
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: PasswordParams::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordParams::minimal()).unwrap()
    }

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::new(s.to_string())
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hashed = hasher.hash(&pw("pw123")).unwrap();

        assert!(hasher.verify(&pw("pw123"), &hashed));
        assert!(!hasher.verify(&pw("pw124"), &hashed));
        assert!(!hasher.verify(&pw(""), &hashed));
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let hashed = hasher().hash(&pw("pw123")).unwrap();
        assert_ne!(hashed.as_phc_string(), "pw123");
        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let a = hasher.hash(&pw("same")).unwrap();
        let b = hasher.hash(&pw("same")).unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify(&pw("same"), &a));
        assert!(hasher.verify(&pw("same"), &b));
    }

    #[test]
    fn test_verify_uses_digest_parameters() {
        let cheap = hasher();
        let hashed = cheap.hash(&pw("secret")).unwrap();

        let stronger = PasswordHasher::new(PasswordParams {
            memory_kib: 4096,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.verify(&pw("secret"), &hashed));
    }

    #[test]
    fn test_compatibility_forms_stay_distinct() {
        let hasher = hasher();
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A is not "A"
        let hashed = hasher.hash(&pw("\u{FF21}bc")).unwrap();
        assert!(hasher.verify(&pw("\u{FF21}bc"), &hashed));
        assert!(!hasher.verify(&pw("Abc"), &hashed));
        assert!(!pw("\u{FF21}bc").ct_eq(&pw("Abc")));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let hasher = hasher();
        let hashed = hasher.hash(&pw("roundtrip")).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(hasher.verify(&pw("roundtrip"), &restored));
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(matches!(
            HashedPassword::from_phc_string("pbkdf2:sha256:260000$salt$abcdef"),
            Err(PasswordHashError::InvalidHashFormat)
        ));
    }

    const WERKZEUG_SHA256: &str = "pbkdf2:sha256:1000$Xo3qM2Ab$46fe028f446d212328b2d42b2d94ffdbc950e1d1c20d62a4f4b509c45d794dd7";

    #[test]
    fn test_werkzeug_pbkdf2_sha256() {
        let legacy = HashedPassword::from_stored(WERKZEUG_SHA256);
        assert!(legacy.is_supported());
        assert!(legacy.is_legacy());
        assert!(hasher().verify(&pw("pw123"), &legacy));
        assert!(!hasher().verify(&pw("pw124"), &legacy));
        assert!(!hasher().verify(&pw(""), &legacy));
    }

    #[test]
    fn test_werkzeug_pbkdf2_sha512() {
        let legacy = HashedPassword::from_stored(
            "pbkdf2:sha512:1000$Xo3qM2Ab$8ad0eef789e15656abbd7da0fe2939c12ed1d0d3041cafc3d59d024136838d01816bef26e988c3e6a48c84b292f3d5041e3a6fff937b14732ca46747b7d09e1a",
        );
        assert!(hasher().verify(&pw("pw123"), &legacy));
        assert!(!hasher().verify(&pw("pw12"), &legacy));
    }

    #[test]
    fn test_unsupported_stored_digest_never_verifies() {
        for digest in [
            "pbkdf2:sha256$Xo3qM2Ab$46fe028f",
            "pbkdf2:md5:1000$Xo3qM2Ab$46fe028f",
            "pbkdf2:sha256:0$Xo3qM2Ab$46fe028f",
            "pbkdf2:sha256:1000$Xo3qM2Ab$not-hex",
            "scrypt:32768:8:1$salt$abcdef",
            "pw123",
        ] {
            let stored = HashedPassword::from_stored(digest);
            assert!(!stored.is_supported(), "{digest}");
            assert!(!hasher().verify(&pw("pw123"), &stored), "{digest}");
        }
    }

    #[test]
    fn test_argon2_digest_is_not_legacy() {
        let hashed = hasher().hash(&pw("pw123")).unwrap();
        assert!(hashed.is_supported());
        assert!(!hashed.is_legacy());
    }

    #[test]
    fn test_invalid_params() {
        let result = PasswordHasher::new(PasswordParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordHashError::InvalidParams(_))));
    }

    #[test]
    fn test_verify_dummy_is_false() {
        assert!(!hasher().verify_dummy(&pw("classroom-dummy-password")));
    }

    #[test]
    fn test_ct_eq() {
        assert!(pw("pw123").ct_eq(&pw("pw123")));
        assert!(!pw("pw123").ct_eq(&pw("pw456")));
        assert!(!pw("pw").ct_eq(&pw("pw123")));
    }

    #[test]
    fn test_debug_redaction() {
        let debug_output = format!("{:?}", pw("secret"));
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hashed = hasher().hash(&pw("secret")).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }
}
