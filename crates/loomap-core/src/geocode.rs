// ── Reverse geocoding ──
//
// Best-effort coordinate-to-address lookup. Exactly one external call per
// resolve; every failure degrades to "no address".

use tracing::{debug, warn};

use loomap_api::GeocodingClient;

use crate::model::GeoPosition;

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Option<GeocodingClient>,
}

impl ReverseGeocoder {
    pub fn new(client: GeocodingClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A geocoder that never produces an address.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// First formatted address at `pos`, if the lookup service knows one.
    ///
    /// Transport and service errors are logged and reported as `None`,
    /// same as an empty result set.
    pub async fn resolve(&self, pos: GeoPosition) -> Option<String> {
        let client = self.client.as_ref()?;

        match client.reverse(pos.latitude, pos.longitude).await {
            Ok(results) => {
                let address = results
                    .into_iter()
                    .find_map(|r| r.formatted_address.filter(|a| !a.trim().is_empty()));
                if address.is_none() {
                    debug!(%pos, "no address at position");
                }
                address
            }
            Err(e) => {
                warn!(%pos, error = %e, "reverse geocoding failed");
                None
            }
        }
    }
}
