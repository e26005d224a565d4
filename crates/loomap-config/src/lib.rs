//! Shared configuration for loomap.
//!
//! TOML profiles, secret resolution (env + keyring + plaintext), bearer
//! credential storage, and translation to `loomap_core::ClientConfig`.
//! The CLI adds `GlobalOpts`-aware wrappers on top.

mod credentials;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use loomap_core::{ClientConfig, DEFAULT_CENTER, GeoPosition, GeocoderConfig, TlsVerification};

pub use credentials::{
    CredentialBackend, FileCredentialStore, KEYRING_SERVICE, KeyringCredentialStore,
    credential_store, token_path,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("credential store error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Facility backend base URL (e.g., "http://localhost:8080").
    pub api_url: String,

    /// Reverse-geocoding endpoint. Unset disables address lookups.
    pub geocoder_url: Option<String>,

    /// Geocoder API key (plaintext -- prefer keyring or env var).
    pub geocoder_api_key: Option<String>,

    /// Environment variable name containing the geocoder API key.
    pub geocoder_api_key_env: Option<String>,

    /// Fixed device position as "lat,lng" (there is no GPS on a terminal).
    pub location: Option<String>,

    /// Map center fallback as "lat,lng".
    pub default_center: Option<String>,

    /// Where the bearer credential lives.
    #[serde(default)]
    pub credential_store: CredentialBackend,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "loomap", "loomap")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub(crate) fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("loomap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Env vars use `__` as the nesting separator, e.g.
/// `LOOMAP_DEFAULTS__TIMEOUT=10`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LOOMAP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the geocoder API key: env var named by the profile, then
/// the system keyring, then plaintext. Absent is fine.
pub fn resolve_geocoder_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's geocoder_api_key_env → env var lookup
    if let Some(ref env_name) = profile.geocoder_api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/geocoder-key"))
    {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .geocoder_api_key
        .as_ref()
        .map(|key| SecretString::from(key.clone()))
}

fn parse_point(field: &str, raw: &str) -> Result<GeoPosition, ConfigError> {
    raw.parse().map_err(|e: loomap_core::InvalidPoint| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// The profile's fixed device position, if one is configured.
pub fn profile_location(profile: &Profile) -> Result<Option<GeoPosition>, ConfigError> {
    profile
        .location
        .as_deref()
        .map(|raw| parse_point("location", raw))
        .transpose()
}

/// Build a `ClientConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    let api_url = parse_url("api_url", &profile.api_url)?;

    let geocoder = profile
        .geocoder_url
        .as_deref()
        .map(|raw| -> Result<GeocoderConfig, ConfigError> {
            Ok(GeocoderConfig {
                url: parse_url("geocoder_url", raw)?,
                api_key: resolve_geocoder_key(profile, profile_name),
            })
        })
        .transpose()?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let default_center = profile
        .default_center
        .as_deref()
        .map(|raw| parse_point("default_center", raw))
        .transpose()?
        .unwrap_or(DEFAULT_CENTER);

    Ok(ClientConfig {
        api_url,
        geocoder,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
        default_center,
    })
}
