//! Session guard and map/modal state layer between `loomap-api` and UI
//! consumers (the CLI, or any embedding renderer).
//!
//! - **[`TokenGuard`]**: decodes the stored bearer credential locally and
//!   clears it once it is expired or malformed.
//!
//! - **[`GeoPositionProvider`]**: one-shot device position through a
//!   pluggable [`LocationService`].
//!
//! - **[`ReverseGeocoder`]**: best-effort coordinate-to-address lookup.
//!
//! - **[`FacilityStore`]**: reactive facility cache (`DashMap` + `watch`
//!   snapshots). Adds apply when the backend answers; deletes only after
//!   the backend confirms.
//!
//! - **[`ModalWorkflow`]**: the single visible modal, with
//!   [`ModalTicket`]s so late results can tell whether their modal is
//!   still open.
//!
//! - **[`ReviewPanel`]**: per-facility review list and draft submission.
//!
//! - **[`Dashboard`]**: facade tying the above together for the
//!   authenticated map screen.

pub mod config;
mod convert;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod model;
pub mod reviews;
pub mod session;
pub mod store;
pub mod stream;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_CENTER, GeocoderConfig, TlsVerification};
pub use dashboard::{Dashboard, MapEvent, OpenedModal};
pub use error::CoreError;
pub use geo::{GeoPositionProvider, GeoState, LocationError, LocationService, StaticLocation};
pub use geocode::ReverseGeocoder;
pub use reviews::{ReviewPanel, ReviewPanelState};
pub use session::{CredentialStore, MemoryCredentialStore, Session, TokenGuard};
pub use store::FacilityStore;
pub use stream::FacilityStream;
pub use workflow::{AddForm, ModalState, ModalTicket, ModalWorkflow, ViewContext};

pub use model::{
    Access, Facility, FacilityDraft, FacilityId, Gender, GeoPosition, InvalidPoint, Review,
    ReviewDraft,
};
