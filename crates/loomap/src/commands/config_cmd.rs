//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use loomap_config::CredentialBackend;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, KEYRING_SERVICE, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref url) = p.geocoder_url {
            let _ = writeln!(out, "geocoder_url = \"{url}\"");
        }
        if p.geocoder_api_key.is_some() {
            let _ = writeln!(out, "geocoder_api_key = \"****\"");
        }
        if let Some(ref env) = p.geocoder_api_key_env {
            let _ = writeln!(out, "geocoder_api_key_env = \"{env}\"");
        }
        if let Some(ref location) = p.location {
            let _ = writeln!(out, "location = \"{location}\"");
        }
        if let Some(ref center) = p.default_center {
            let _ = writeln!(out, "default_center = \"{center}\"");
        }
        let _ = writeln!(
            out,
            "credential_store = \"{}\"",
            backend_name(p.credential_store)
        );
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn backend_name(backend: CredentialBackend) -> &'static str {
    match backend {
        CredentialBackend::Keyring => "keyring",
        CredentialBackend::File => "file",
    }
}

fn parse_backend(value: &str) -> Result<CredentialBackend, CliError> {
    match value {
        "keyring" => Ok(CredentialBackend::Keyring),
        "file" => Ok(CredentialBackend::File),
        _ => Err(CliError::Validation {
            field: "credential_store".into(),
            reason: "must be 'keyring' or 'file'".into(),
        }),
    }
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn store_geocoder_key(profile_name: &str, key: &str) -> Result<(), CliError> {
    let keyring_err = |e: keyring::Error| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store geocoder key in keyring: {e}"),
    };
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/geocoder-key"))
        .map_err(keyring_err)?
        .set_password(key)
        .map_err(keyring_err)
}

/// Optional text prompt; an empty answer means "not set".
fn prompt_optional(prompt: &str) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("loomap -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Backend URL")
                .default("http://localhost:8080".into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(api_url);

            profile.geocoder_url = prompt_optional("Geocoder URL (empty to skip)")?;
            if profile.geocoder_url.is_some() {
                let key = rpassword::prompt_password("Geocoder API key (empty for none): ")
                    .map_err(prompt_err)?;
                if !key.is_empty() {
                    let choices = &[
                        "Store in system keyring (recommended)",
                        "Save to config file (plaintext)",
                    ];
                    let selection = Select::new()
                        .with_prompt("Where to store the geocoder key?")
                        .items(choices)
                        .default(0)
                        .interact()
                        .map_err(prompt_err)?;
                    if selection == 0 {
                        store_geocoder_key(&profile_name, &key)?;
                        eprintln!("   ✓ Geocoder key stored in system keyring");
                    } else {
                        profile.geocoder_api_key = Some(key);
                    }
                }
            }

            if let Some(location) = prompt_optional("Your position as lat,lng (empty to skip)")? {
                util::parse_position("location", &location)?;
                profile.location = Some(location);
            }

            let stores = &["System keyring (recommended)", "File in the data directory"];
            let selection = Select::new()
                .with_prompt("Where to keep the login session?")
                .items(stores)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            profile.credential_store = if selection == 0 {
                CredentialBackend::Keyring
            } else {
                CredentialBackend::File
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };

            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: loomap login");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.geocoder_api_key.is_some() {
                    profile.geocoder_api_key = Some("****".into());
                }
            }
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "api_url" | "api-url" => profile.api_url = value,
                "geocoder_url" | "geocoder-url" => profile.geocoder_url = Some(value),
                "geocoder_api_key" | "geocoder-api-key" => {
                    profile.geocoder_api_key = Some(value);
                }
                "geocoder_api_key_env" | "geocoder-api-key-env" => {
                    profile.geocoder_api_key_env = Some(value);
                }
                "location" => {
                    util::parse_position("location", &value)?;
                    profile.location = Some(value);
                }
                "default_center" | "default-center" => {
                    util::parse_position("default_center", &value)?;
                    profile.default_center = Some(value);
                }
                "credential_store" | "credential-store" => {
                    profile.credential_store = parse_backend(&value)?;
                }
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: api_url, geocoder_url, \
                             geocoder_api_key, geocoder_api_key_env, location, default_center, \
                             credential_store, insecure, timeout, ca_cert"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            output::success(global, &format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: loomap config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::success(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }

        // ── SetGeocoderKey ──────────────────────────────────────────
        ConfigCommand::SetGeocoderKey { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let key = rpassword::prompt_password("Geocoder API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "geocoder_api_key".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            store_geocoder_key(&profile_name, &key)?;

            output::success(
                global,
                &format!("Geocoder key stored in system keyring for profile '{profile_name}'"),
            );
            Ok(())
        }
    }
}
