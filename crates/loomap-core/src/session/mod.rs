// ── Session guard ──
//
// Decodes the stored bearer credential locally (no server round-trip)
// and clears it as soon as it is found expired or malformed. Expiry is
// detected lazily on the next check; nothing runs on a timer.

mod store;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::CoreError;

pub use store::{CredentialStore, MemoryCredentialStore};

// ── Session ─────────────────────────────────────────────────────────

/// Identity carried by a valid credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// User id of the credential's holder.
    pub subject: i64,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

/// Why a credential could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected three dot-separated segments")]
    Structure,
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no numeric `user_id` or `sub`")]
    MissingSubject,
    #[error("payload has no usable `exp`")]
    MissingExpiry,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    iat: Option<f64>,
    #[serde(default)]
    exp: Option<f64>,
}

/// A JWT NumericDate: seconds since the epoch, possibly fractional.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn numeric_date(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

impl Session {
    /// Decode the payload segment of a `header.payload.signature` token.
    ///
    /// The signature is not checked; the backend is the authority.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DecodeError::Structure);
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims: Claims = serde_json::from_slice(&bytes)?;

        let subject = claims
            .user_id
            .or_else(|| match claims.sub {
                Some(Value::Number(n)) => n.as_i64(),
                Some(Value::String(s)) => s.parse().ok(),
                _ => None,
            })
            .ok_or(DecodeError::MissingSubject)?;

        let expires_at = claims
            .exp
            .and_then(numeric_date)
            .ok_or(DecodeError::MissingExpiry)?;

        Ok(Self {
            subject,
            issued_at: claims.iat.and_then(numeric_date),
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// ── TokenGuard ──────────────────────────────────────────────────────

/// Gatekeeper for everything that needs an authenticated user.
///
/// Cheaply cloneable; all clones share one credential store.
#[derive(Clone)]
pub struct TokenGuard {
    store: Arc<dyn CredentialStore>,
}

impl TokenGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The current session, or `None` if there is no valid credential.
    ///
    /// A credential that is expired or fails to decode is removed from
    /// storage as a side effect.
    pub fn current_session(&self) -> Option<Session> {
        self.current_session_at(Utc::now())
    }

    /// [`current_session`](Self::current_session) against an explicit clock.
    pub fn current_session_at(&self, now: DateTime<Utc>) -> Option<Session> {
        self.validated_at(now).map(|(session, _)| session)
    }

    /// Session plus the raw credential, or [`CoreError::AuthExpired`].
    pub fn require(&self) -> Result<(Session, SecretString), CoreError> {
        self.validated_at(Utc::now()).ok_or(CoreError::AuthExpired)
    }

    /// The credential to attach to optional-auth reads, if it is valid.
    pub fn bearer(&self) -> Option<SecretString> {
        self.validated_at(Utc::now()).map(|(_, token)| token)
    }

    /// Store a freshly issued credential (login success).
    ///
    /// The credential is decoded first; one that is already unusable is
    /// rejected and nothing is stored.
    pub fn establish(&self, token: &SecretString) -> Result<Session, CoreError> {
        let session =
            Session::decode(token.expose_secret()).map_err(|e| CoreError::AuthenticationFailed {
                message: format!("backend issued an unreadable credential: {e}"),
            })?;
        if session.is_expired_at(Utc::now()) {
            return Err(CoreError::AuthenticationFailed {
                message: "backend issued an already expired credential".into(),
            });
        }
        self.store.save(token)?;
        debug!(subject = session.subject, expires_at = %session.expires_at, "session established");
        Ok(session)
    }

    /// Discard the stored credential (logout, expiry, or a 401).
    pub fn invalidate(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored credential");
        }
    }

    /// Translate a backend error, dropping the credential on a 401 so the
    /// next check sends the user to login.
    pub(crate) fn translate(&self, err: loomap_api::Error) -> CoreError {
        if err.is_auth_expired() {
            debug!("backend rejected credential, clearing");
            self.invalidate();
        }
        CoreError::from(err)
    }

    fn validated_at(&self, now: DateTime<Utc>) -> Option<(Session, SecretString)> {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "credential store unreadable, treating as logged out");
                return None;
            }
        };

        match Session::decode(token.expose_secret()) {
            Ok(session) if !session.is_expired_at(now) => Some((session, token)),
            Ok(session) => {
                debug!(expires_at = %session.expires_at, "credential expired, clearing");
                self.invalidate();
                None
            }
            Err(e) => {
                debug!(error = %e, "credential malformed, clearing");
                self.invalidate();
                None
            }
        }
    }
}
