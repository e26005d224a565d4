// ── Credential storage ──
//
// The bearer credential is the only persisted client state. Where it
// lives (keyring, file, memory) is the embedder's choice.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;

use crate::error::CoreError;

/// Backing storage for the single bearer credential.
///
/// Implementations are synchronous: every backend in use (keyring,
/// small file, memory) answers immediately.
pub trait CredentialStore: Send + Sync {
    /// The stored credential, if any.
    fn load(&self) -> Result<Option<SecretString>, CoreError>;

    /// Replace the stored credential.
    fn save(&self, token: &SecretString) -> Result<(), CoreError>;

    /// Remove the stored credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), CoreError>;
}

/// Process-local credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: ArcSwapOption<SecretString>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: ArcSwapOption::from_pointee(token),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.token.load_full().map(|t| SecretString::clone(&t)))
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.token.store(Some(Arc::new(token.clone())));
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.token.store(None);
        Ok(())
    }
}
