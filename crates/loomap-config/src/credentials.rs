// Bearer credential storage backends.
//
// The credential is stored under `"{profile}/token"`, either in the
// system keyring (service `loomap`) or in a `token` file under the
// profile's data directory.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use loomap_core::{CoreError, CredentialStore};

use crate::{ConfigError, Profile, dirs_fallback, project_dirs};

pub const KEYRING_SERVICE: &str = "loomap";

/// Which backend holds a profile's bearer credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    Keyring,
    File,
}

fn store_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::Config {
        message: format!("credential store: {err}"),
    }
}

// ── Keyring ─────────────────────────────────────────────────────────

pub struct KeyringCredentialStore {
    entry: keyring::Entry,
}

impl KeyringCredentialStore {
    pub fn new(profile_name: &str) -> Result<Self, ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.entry
            .set_password(token.expose_secret())
            .map_err(store_error)
    }

    fn clear(&self) -> Result<(), CoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(store_error(e)),
        }
    }
}

// ── File ────────────────────────────────────────────────────────────

/// Plain file holding just the credential, readable only by its owner.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| SecretString::from(token.to_owned())))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(store_error)?;
        }
        std::fs::write(&self.path, token.expose_secret()).map_err(store_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(store_error)?;
        }
        debug!(path = %self.path.display(), "credential written");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error(e)),
        }
    }
}

// ── Selection ───────────────────────────────────────────────────────

/// Default token file location for a profile.
pub fn token_path(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    base.join(profile_name).join("token")
}

/// Open the credential store a profile is configured for.
pub fn credential_store(
    profile: &Profile,
    profile_name: &str,
) -> Result<Arc<dyn CredentialStore>, ConfigError> {
    Ok(match profile.credential_store {
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(profile_name)?),
        CredentialBackend::File => Arc::new(FileCredentialStore::new(token_path(profile_name))),
    })
}
