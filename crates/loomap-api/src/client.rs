// Facility backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-credential
// injection, and status/JSON handling. Endpoint groups (toilets, reviews,
// users) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the facility backend.
///
/// Stateless with respect to authentication: the caller passes the bearer
/// credential to every call that needs it, so the credential store stays
/// the single source of truth.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a backend client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path, e.g. `toilet/add`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach `Authorization: Bearer ...` when a credential is present.
    pub(crate) fn with_bearer(
        builder: RequestBuilder,
        token: Option<&SecretString>,
    ) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and fail on non-success status.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, Error> {
        let resp = builder.send().await?;
        check_status(resp).await
    }

    /// GET a JSON array; a `null` body is treated as an empty list.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&SecretString>,
    ) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);
        let resp = self
            .send(Self::with_bearer(self.http.get(url), token))
            .await?;
        let items: Option<Vec<T>> = parse_json(resp).await?;
        Ok(items.unwrap_or_default())
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Map non-success responses to typed errors, passing success through.
pub(crate) async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: preview(body.trim()),
    })
}

/// Read the body and deserialize it, keeping a preview on failure.
pub(crate) async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let body = resp.text().await?;
    trace!(len = body.len(), "response body received");
    decode_body(&body)
}

/// Like [`parse_json`], but an empty body is `None` rather than an error.
pub(crate) async fn parse_json_or_empty<T: DeserializeOwned>(
    resp: Response,
) -> Result<Option<T>, Error> {
    let body = resp.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// First 200 characters of a body, for error messages.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
