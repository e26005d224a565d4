// ── Core error types ──
//
// User-facing errors from loomap-core. Consumers never see raw HTTP
// status handling or JSON parse failures directly: the
// `From<loomap_api::Error>` impl translates transport-layer errors into
// the recovery classes the UI layer acts on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// Credential missing, unparseable, expired, or rejected by the
    /// backend. Recovery is always "go to login", never a modal error.
    #[error("Not logged in or session expired -- log in again")]
    AuthExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Network errors ───────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Workflow errors ──────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Facility not found: {identifier}")]
    NotFound { identifier: String },

    #[error("No modal is open for this action")]
    NoActiveModal,

    // ── Geolocation errors ───────────────────────────────────────────
    #[error("Location unavailable")]
    GeolocationUnavailable,

    #[error("Location acquisition failed: {reason}")]
    GeolocationFailed { reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller should send the user to login.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<loomap_api::Error> for CoreError {
    fn from(err: loomap_api::Error) -> Self {
        match err {
            loomap_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            loomap_api::Error::Unauthorized => CoreError::AuthExpired,
            loomap_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            loomap_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            loomap_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            loomap_api::Error::Api { status: 404, message } => CoreError::NotFound {
                identifier: message,
            },
            loomap_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            loomap_api::Error::Geocoding { message } => CoreError::Api {
                message: format!("geocoder: {message}"),
                status: None,
            },
            loomap_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_becomes_auth_expired() {
        let err = CoreError::from(loomap_api::Error::Unauthorized);
        assert!(err.is_auth_expired());
    }

    #[test]
    fn backend_status_is_kept() {
        let err = CoreError::from(loomap_api::Error::Api {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(
            err,
            CoreError::Api {
                status: Some(500),
                ..
            }
        ));
    }
}
