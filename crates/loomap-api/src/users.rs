// User endpoints
//
// `POST /login` returns a signed bearer token; `POST /user/create`
// registers a new account. Neither requires a credential.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{BackendClient, parse_json};
use crate::error::Error;
use crate::models::LoginResponse;

impl BackendClient {
    /// Exchange username/password for a bearer token.
    ///
    /// Any non-success status is reported as [`Error::Authentication`]
    /// (the backend answers bad credentials with a 500).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.endpoint("login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self.http().post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body.trim()),
            });
        }

        let login: LoginResponse = parse_json(resp).await?;
        if login.token.is_empty() {
            return Err(Error::Authentication {
                message: "login response carried an empty token".into(),
            });
        }

        debug!("login successful");
        Ok(SecretString::from(login.token))
    }

    /// Register a new account.
    pub async fn register(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.endpoint("user/create")?;
        debug!("registering at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        self.send(self.http().post(url).json(&body)).await?;
        Ok(())
    }
}
