//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use loomap_config::ConfigError;
use loomap_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(loomap::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(loomap::not_logged_in),
        help("Your session is missing or has expired.\nRun: loomap login")
    )]
    NotLoggedIn,

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(loomap::auth_failed),
        help("Check your username and password.")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Toilet '{identifier}' not found")]
    #[diagnostic(
        code(loomap::not_found),
        help("Run: loomap toilets list to see available toilets")
    )]
    NotFound { identifier: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(loomap::api_error))]
    ApiError { message: String },

    #[error("Location unavailable: {reason}")]
    #[diagnostic(
        code(loomap::no_location),
        help(
            "Pass --location lat,lng or set it on the profile:\n\
             loomap config set location 55.75,37.61"
        )
    )]
    NoLocation { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(loomap::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(loomap::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: loomap config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(loomap::no_config),
        help(
            "Create a profile with: loomap config init\n\
             Or pass --api-url. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(loomap::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(loomap::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(loomap::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(loomap::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotLoggedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoLocation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthExpired => Self::NotLoggedIn,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::Api { message, status } => Self::ApiError {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::NotFound { identifier } => Self::NotFound { identifier },
            CoreError::GeolocationUnavailable => Self::NoLocation {
                reason: "no position configured".into(),
            },
            CoreError::GeolocationFailed { reason } => Self::NoLocation { reason },
            CoreError::Config { message } => Self::Internal(message),
            CoreError::NoActiveModal | CoreError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
