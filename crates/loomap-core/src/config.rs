// ── Runtime client configuration ──
//
// These types describe *where* the backend and geocoder live and how to
// reach them. They never touch disk: the CLI builds a `ClientConfig`
// from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use loomap_api::{TlsMode, TransportConfig};

use crate::model::GeoPosition;

/// Map center used until something better is known.
pub const DEFAULT_CENTER: GeoPosition = GeoPosition {
    latitude: 55.751_244,
    longitude: 37.618_423,
};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Where the reverse-geocoding service lives.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Full endpoint URL, e.g. `https://maps.googleapis.com/maps/api/geocode/json`.
    pub url: Url,
    pub api_key: Option<SecretString>,
}

/// Configuration for one backend deployment.
///
/// Built by the CLI, passed to `Dashboard` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Facility backend base URL (e.g. `http://localhost:8080`).
    pub api_url: Url,
    /// Reverse geocoder. `None` disables address lookups entirely.
    pub geocoder: Option<GeocoderConfig>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Fallback center when there is neither a position nor a facility.
    pub default_center: GeoPosition,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            geocoder: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            default_center: DEFAULT_CENTER,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
