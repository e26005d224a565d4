// ── Review domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MAX_SCORE: u8 = 5;

/// A review of one facility. Fetched per facility and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub title: String,
    pub body: String,
    /// Always within `0..=5`.
    pub score: u8,
    pub facility_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

/// The review form's inputs.
///
/// `score` is signed so that out-of-range input can be represented and
/// rejected rather than silently clamped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub title: String,
    pub body: String,
    pub score: i32,
}

impl ReviewDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, score: i32) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            score,
        }
    }

    /// Check the draft and return its validated score.
    pub fn validate(&self) -> Result<u8, CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("review title must not be empty"));
        }
        if self.body.trim().is_empty() {
            return Err(CoreError::validation("review text must not be empty"));
        }
        u8::try_from(self.score)
            .ok()
            .filter(|s| *s <= MAX_SCORE)
            .ok_or_else(|| {
                CoreError::validation(format!(
                    "score must be between 0 and {MAX_SCORE}, got {}",
                    self.score
                ))
            })
    }

    /// Back to empty inputs and a zero score.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
