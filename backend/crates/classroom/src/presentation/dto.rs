//! Form DTOs
//!
//! Every field is optional so that a missing field reaches the use case and
//! produces the matching validation message instead of a form rejection.

use serde::Deserialize;

use crate::application::{LoginInput, RegisterInput};

// ============================================================================
// Register
// ============================================================================

/// POST /register form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl From<RegisterForm> for RegisterInput {
    fn from(form: RegisterForm) -> Self {
        Self {
            username: form.username,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /login form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<LoginForm> for LoginInput {
    fn from(form: LoginForm) -> Self {
        Self {
            username: form.username,
            password: form.password,
        }
    }
}
