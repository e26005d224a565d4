// Reverse-geocoding client
//
// Talks to a Google-style geocoding endpoint:
// `GET {base}?latlng={lat},{lng}&key={key}` answering
// `{ "results": [{ "formatted_address": "..." }], "status": "OK" }`.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::client::{check_status, parse_json};
use crate::error::Error;
use crate::models::{GeocodeResponse, GeocodeResult};
use crate::transport::TransportConfig;

/// Statuses that mean "the lookup worked", whether or not it matched.
const OK_STATUSES: &[&str] = &["OK", "ZERO_RESULTS"];

/// Raw HTTP client for the reverse-geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl GeocodingClient {
    pub fn new(
        base_url: Url,
        api_key: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    pub fn with_client(http: reqwest::Client, base_url: Url, api_key: Option<SecretString>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Look up the addresses at a coordinate pair, best match first.
    ///
    /// An empty list is a valid answer (`ZERO_RESULTS`).
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeResult>, Error> {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("latlng", &format!("{lat},{lng}"));
            if let Some(ref key) = self.api_key {
                query.append_pair("key", key.expose_secret());
            }
        }

        debug!(lat, lng, "reverse geocoding");
        let resp = check_status(self.http.get(url).send().await?).await?;
        let body: GeocodeResponse = parse_json(resp).await?;

        match body.status.as_deref() {
            None => {}
            Some(status) if OK_STATUSES.contains(&status) => {}
            Some(status) => {
                return Err(Error::Geocoding {
                    message: body
                        .error_message
                        .unwrap_or_else(|| format!("status {status}")),
                });
            }
        }

        Ok(body.results)
    }
}
