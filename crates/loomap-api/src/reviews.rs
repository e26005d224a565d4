// Review endpoints
//
// `GET /toilet/{id}/reviews`, `POST /review/add`.

use secrecy::SecretString;
use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{NewReview, Review};

impl BackendClient {
    /// List the reviews of one facility, in backend order.
    pub async fn list_reviews(
        &self,
        toilet_id: i64,
        token: Option<&SecretString>,
    ) -> Result<Vec<Review>, Error> {
        let url = self.endpoint(&format!("toilet/{toilet_id}/reviews"))?;
        self.get_list(url, token).await
    }

    /// Submit a review. The response body is ignored.
    pub async fn add_review(&self, token: &SecretString, review: &NewReview) -> Result<(), Error> {
        let url = self.endpoint("review/add")?;
        debug!(toilet_id = review.toilet_id, "POST {}", url);

        let builder = Self::with_bearer(self.http().post(url), Some(token)).json(review);
        self.send(builder).await?;
        Ok(())
    }
}
