//! Classroom Error Types
//!
//! [`ValidationError`] covers problems with the submitted form and is shown
//! to the player verbatim. Everything else is wrapped in [`ClassroomError`],
//! logged, and shown as a generic message.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::presentation::views::ErrorView;

/// Classroom result type alias
pub type ClassroomResult<T> = Result<T, ClassroomError>;

/// Message shown for any failure that is not the player's fault
pub const GENERIC_ERROR_MESSAGE: &str = "something went wrong, please try again";

/// Form validation failures
///
/// The display strings are the exact messages rendered in the error view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please provide username")]
    MissingUsername,

    /// Also produced when the storage-level unique index rejects an insert
    #[error("username already exists")]
    UsernameTaken,

    #[error("please provide password")]
    MissingPassword,

    #[error("please provide confirmation password")]
    MissingConfirmation,

    #[error("passwords did not match")]
    PasswordMismatch,

    /// Unknown username and wrong password share this variant
    #[error("invalid username and/or password")]
    InvalidCredentials,
}

/// Classroom error variants
#[derive(Debug, Error)]
pub enum ClassroomError {
    /// Rejected form input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClassroomError {
    /// Get the HTTP status code for this error
    ///
    /// Validation errors are ordinary page renders, so they use 200.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassroomError::Validation(_) => StatusCode::OK,
            ClassroomError::Database(_)
            | ClassroomError::Template(_)
            | ClassroomError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the player gets to see
    pub fn public_message(&self) -> String {
        match self {
            ClassroomError::Validation(e) => e.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// The validation failure, if that is what this is
    pub fn as_validation(&self) -> Option<ValidationError> {
        match self {
            ClassroomError::Validation(e) => Some(*e),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            ClassroomError::Database(e) => {
                tracing::error!(error = %e, "Classroom database error");
            }
            ClassroomError::Template(e) => {
                tracing::error!(error = %e, "Template rendering failed");
            }
            ClassroomError::Internal(msg) => {
                tracing::error!(message = %msg, "Classroom internal error");
            }
            ClassroomError::Validation(ValidationError::InvalidCredentials) => {
                tracing::warn!("Invalid login attempt");
            }
            ClassroomError::Validation(e) => {
                tracing::debug!(error = %e, "Form rejected");
            }
        }
    }
}

impl From<platform::password::PasswordHashError> for ClassroomError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        ClassroomError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ClassroomError {
    fn from(err: serde_json::Error) -> Self {
        ClassroomError::Internal(format!("Session state encoding failed: {err}"))
    }
}

impl IntoResponse for ClassroomError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        match ErrorView::new(self.public_message()).render_html() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Error view failed to render");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE).into_response()
            }
        }
    }
}
