// Wire types for the facility backend and the geocoding service.
//
// Every response field is optional: the backend is loosely typed and
// different deployments omit different fields. Normalization into strong
// domain types happens in `loomap-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Facilities ──────────────────────────────────────────────────────

/// A facility ("toilet") as returned by `GET /toilets` or `POST /toilet/add`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toilet {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub founder_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// `"lat,lng"` -- not validated here.
    #[serde(default)]
    pub point: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(rename = "type", default)]
    pub toilet_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of `POST /toilet/add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewToilet {
    pub name: String,
    pub point: String,
    pub gender: String,
    #[serde(rename = "type")]
    pub toilet_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Body of `DELETE /toilet/delete`.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct DeleteToilet {
    pub id: i64,
}

// ── Reviews ─────────────────────────────────────────────────────────

/// A review as returned by `GET /toilet/{id}/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub toilet_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub review_text: String,
    /// The backend stores scores as floats.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of `POST /review/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub toilet_id: i64,
    pub title: String,
    pub review_text: String,
    pub score: u8,
}

// ── Users ───────────────────────────────────────────────────────────

/// Response of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

// ── Geocoding ───────────────────────────────────────────────────────

/// Reverse-geocoding response envelope (`{ results: [...], status }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A single reverse-geocoding match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
}
