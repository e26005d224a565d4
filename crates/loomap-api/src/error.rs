use thiserror::Error;

/// Top-level error type for the `loomap-api` crate.
///
/// Covers every failure mode of the two HTTP surfaces this crate talks to:
/// the facility backend and the reverse-geocoding service.
/// `loomap-core` maps these into its own user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong username/password, unknown user).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The backend rejected the bearer credential (HTTP 401).
    #[error("Bearer credential rejected -- re-authentication required")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate setup error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success status from the facility backend.
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Geocoding ───────────────────────────────────────────────────
    /// The geocoding service answered with a non-OK status.
    #[error("Geocoding service error: {message}")]
    Geocoding { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the stored credential should be considered dead.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
