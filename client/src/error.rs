use std::borrow::Cow;
use std::collections::BTreeMap;

use reqwest::StatusCode;
use shared::ErrorResponse;
use tracing::{debug, error, warn};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type FieldErrors = BTreeMap<Cow<'static, str>, Vec<Cow<'static, str>>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {}", describe_fields(.errors))]
    Validation { errors: FieldErrors },
    #[error("wrong username or password")]
    WrongCredentials,
    #[error("session expired, please log in again")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("request rejected: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("server error ({status})")]
    Server { status: StatusCode, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unexpected response from server")]
    Decode(#[from] serde_json::Error),
    #[error("invalid api url")]
    Url(#[from] url::ParseError),
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("session is still being restored")]
    SessionRestoring,
}

fn describe_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(error)
        }
    }
}

impl Error {
    pub fn validation<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = FieldErrors::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::Validation { errors: error_map }
    }

    /// Maps a non-success backend answer onto the error taxonomy. The
    /// backend reports failures as `{"error": "..."}`; anything else is
    /// kept verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|payload| payload.error)
            .unwrap_or_else(|_| body.trim().to_string());
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!(%status, message = %message, "Backend rejected credentials");
                Error::Unauthorized
            }
            StatusCode::NOT_FOUND => {
                debug!(%status, message = %message, "Resource not found");
                Error::NotFound
            }
            status if status.is_server_error() => {
                error!(%status, message = %message, "Backend failure");
                Error::Server { status, message }
            }
            status => {
                warn!(%status, message = %message, "Request rejected");
                Error::Rejected { status, message }
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::Network(_) | Error::Server { .. }
        )
    }
}
