// loomap-api: Async Rust client for the loomap facility backend

pub mod client;
pub mod error;
pub mod geocode;
pub mod models;
mod reviews;
mod toilets;
pub mod transport;
mod users;

pub use client::BackendClient;
pub use error::Error;
pub use geocode::GeocodingClient;
pub use models::{GeocodeResult, NewReview, NewToilet, Review, Toilet};
pub use transport::{TlsMode, TransportConfig};
