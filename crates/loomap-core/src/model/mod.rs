// ── Domain model ──
//
// Canonical types shared by the store, the workflow, and consumers.

pub mod facility;
pub mod position;
pub mod review;

pub use facility::{Access, Facility, FacilityDraft, FacilityId, Gender};
pub use position::{GeoPosition, InvalidPoint};
pub use review::{Review, ReviewDraft};
