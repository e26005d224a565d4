//! CLI configuration -- thin wrapper around `loomap_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --location, etc.).

use std::sync::Arc;

use loomap_config::CredentialBackend;
use loomap_core::{ClientConfig, CredentialStore, GeoPosition};

use crate::cli::{CredentialStoreKind, GlobalOpts};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use loomap_config::{
    Config, Defaults, KEYRING_SERVICE, Profile, config_path, load_config_or_default, save_config,
};

/// Everything needed to assemble a `Dashboard`.
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub location: Option<GeoPosition>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// The active profile with CLI flag overrides applied.
///
/// Without a stored profile, `--api-url` alone is enough to build one.
pub fn effective_profile(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profiles.get(&profile_name), &global.api_url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(api_url)) => Profile::new(api_url.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name: profile_name,
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref api_url) = global.api_url {
        profile.api_url.clone_from(api_url);
    }
    if let Some(ref location) = global.location {
        profile.location = Some(location.clone());
    }
    if let Some(kind) = global.credential_store {
        profile.credential_store = match kind {
            CredentialStoreKind::Keyring => CredentialBackend::Keyring,
            CredentialStoreKind::File => CredentialBackend::File,
        };
    }
    if global.insecure || cfg.defaults.insecure {
        profile.insecure = Some(true);
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(cfg.defaults.timeout));

    Ok((profile_name, profile))
}

/// Translate the effective profile into core inputs.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let (profile_name, profile) = effective_profile(global)?;

    let client = loomap_config::profile_to_client_config(&profile, &profile_name)?;
    let credentials = loomap_config::credential_store(&profile, &profile_name)?;
    let location = loomap_config::profile_location(&profile)?;

    tracing::debug!(
        profile = %profile_name,
        api_url = %client.api_url,
        geocoder = client.geocoder.is_some(),
        "resolved profile"
    );

    Ok(Resolved {
        profile_name,
        client,
        credentials,
        location,
    })
}
