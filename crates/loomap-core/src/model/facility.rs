// ── Facility domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::position::GeoPosition;

// ── FacilityId ──────────────────────────────────────────────────────

/// Identifier of a facility.
///
/// Normally the backend's numeric id. When the backend omits it on
/// creation, a locally generated placeholder stands in so the entry can
/// still be addressed in the collection; placeholders cannot be deleted
/// remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacilityId {
    Server(i64),
    Local(Uuid),
}

impl FacilityId {
    pub fn placeholder() -> Self {
        Self::Local(Uuid::new_v4())
    }

    pub fn as_server(&self) -> Option<i64> {
        match self {
            Self::Server(id) => Some(*id),
            Self::Local(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{id}"),
            Self::Local(u) => write!(f, "local-{u}"),
        }
    }
}

impl From<i64> for FacilityId {
    fn from(id: i64) -> Self {
        Self::Server(id)
    }
}

// ── Classifications ─────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Whether using the facility costs money.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Access {
    #[default]
    Free,
    Paid,
}

// ── Facility ────────────────────────────────────────────────────────

/// A facility as held by the store.
///
/// `point` is kept verbatim from the backend. Entries whose point does not
/// parse stay in the collection but are never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub point: String,
    pub gender: Option<Gender>,
    pub access: Option<Access>,
    pub address: Option<String>,
    /// User id of whoever created it.
    pub owner: Option<i64>,
}

impl Facility {
    /// Parsed location, or `None` if the stored point is malformed.
    pub fn location(&self) -> Option<GeoPosition> {
        self.point.parse().ok()
    }

    pub fn is_renderable(&self) -> bool {
        self.location().is_some()
    }
}

// ── FacilityDraft ───────────────────────────────────────────────────

/// What the user entered in the add-facility form.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityDraft {
    pub name: String,
    pub location: GeoPosition,
    pub gender: Gender,
    pub access: Access,
    pub address: Option<String>,
}

impl FacilityDraft {
    pub fn new(location: GeoPosition) -> Self {
        Self {
            name: String::new(),
            location,
            gender: Gender::default(),
            access: Access::default(),
            address: None,
        }
    }
}
