// Facility endpoints
//
// `GET /toilets`, `POST /toilet/add`, `DELETE /toilet/delete`.

use secrecy::SecretString;
use tracing::debug;

use crate::client::{BackendClient, parse_json_or_empty};
use crate::error::Error;
use crate::models::{DeleteToilet, NewToilet, Toilet};

impl BackendClient {
    /// List every facility known to the backend.
    ///
    /// The credential is optional: the listing is public, but the backend
    /// accepts it when present.
    pub async fn list_toilets(&self, token: Option<&SecretString>) -> Result<Vec<Toilet>, Error> {
        let url = self.endpoint("toilets")?;
        self.get_list(url, token).await
    }

    /// Create a facility. Returns whatever the backend echoes back; an
    /// empty body yields a `Toilet` with every field unset.
    pub async fn add_toilet(
        &self,
        token: &SecretString,
        toilet: &NewToilet,
    ) -> Result<Toilet, Error> {
        let url = self.endpoint("toilet/add")?;
        debug!("POST {}", url);

        let builder = Self::with_bearer(self.http().post(url), Some(token)).json(toilet);
        let resp = self.send(builder).await?;

        let created: Option<Toilet> = parse_json_or_empty(resp).await?;
        Ok(created.unwrap_or_default())
    }

    /// Delete a facility by id. Succeeds only on a 2xx answer.
    pub async fn delete_toilet(&self, token: &SecretString, id: i64) -> Result<(), Error> {
        let url = self.endpoint("toilet/delete")?;
        debug!(id, "DELETE {}", url);

        let builder =
            Self::with_bearer(self.http().delete(url), Some(token)).json(&DeleteToilet { id });
        self.send(builder).await?;
        Ok(())
    }
}
