// ── Review panel ──
//
// Lives alongside a "view" modal: one review fetch per entry, a local
// draft, and validate-before-send submission. Submitted reviews are not
// appended locally; the list only refreshes on the next entry.

use tokio::sync::watch;
use tracing::{debug, warn};

use loomap_api::{BackendClient, NewReview};

use crate::error::CoreError;
use crate::model::{FacilityId, Review, ReviewDraft};
use crate::session::TokenGuard;
use crate::workflow::ModalTicket;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPanelState {
    /// The view modal this panel belongs to.
    pub ticket: Option<ModalTicket>,
    pub facility: Option<FacilityId>,
    /// Backend order, oldest first.
    pub reviews: Vec<Review>,
    pub loading: bool,
    pub error: Option<String>,
    pub draft: ReviewDraft,
}

pub struct ReviewPanel {
    client: BackendClient,
    guard: TokenGuard,
    state: watch::Sender<ReviewPanelState>,
}

impl ReviewPanel {
    pub fn new(client: BackendClient, guard: TokenGuard) -> Self {
        let (state, _) = watch::channel(ReviewPanelState::default());
        Self {
            client,
            guard,
            state,
        }
    }

    pub fn state(&self) -> ReviewPanelState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReviewPanelState> {
        self.state.subscribe()
    }

    /// Fetch one facility's reviews. Local placeholders have none.
    pub async fn fetch(&self, facility: &FacilityId) -> Result<Vec<Review>, CoreError> {
        let Some(id) = facility.as_server() else {
            return Ok(Vec::new());
        };
        let bearer = self.guard.bearer();
        let reviews = self
            .client
            .list_reviews(id, bearer.as_ref())
            .await
            .map_err(|e| self.guard.translate(e))?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }

    /// Bind the panel to a freshly opened view modal and load its
    /// reviews. The result is dropped if the panel has moved on.
    pub async fn enter(&self, ticket: ModalTicket, facility: FacilityId) {
        self.state.send_replace(ReviewPanelState {
            ticket: Some(ticket),
            facility: Some(facility),
            loading: true,
            ..ReviewPanelState::default()
        });

        let result = self.fetch(&facility).await;

        let applied = self.state.send_if_modified(|state| {
            if state.ticket != Some(ticket) {
                return false;
            }
            state.loading = false;
            match result {
                Ok(reviews) => {
                    debug!(%facility, count = reviews.len(), "reviews loaded");
                    state.reviews = reviews;
                }
                Err(e) => {
                    warn!(%facility, error = %e, "failed to load reviews");
                    state.reviews.clear();
                    state.error = Some(e.to_string());
                }
            }
            true
        });
        if !applied {
            debug!(%ticket, "view closed before reviews arrived, discarding");
        }
    }

    /// Unbind from the view modal.
    pub fn leave(&self) {
        self.state.send_replace(ReviewPanelState::default());
    }

    pub fn edit_draft(&self, edit: impl FnOnce(&mut ReviewDraft)) {
        self.state.send_modify(|state| edit(&mut state.draft));
    }

    /// Validate and send the current draft.
    ///
    /// An invalid draft is rejected without any request. On success the
    /// draft resets; the displayed list is left as is.
    pub async fn submit(&self, ticket: ModalTicket) -> Result<(), CoreError> {
        let (facility, draft) = {
            let state = self.state.borrow();
            if state.ticket != Some(ticket) {
                return Err(CoreError::NoActiveModal);
            }
            let facility = state.facility.ok_or(CoreError::NoActiveModal)?;
            (facility, state.draft.clone())
        };

        let result = self.send(facility, &draft).await;

        self.state.send_modify(|state| {
            if state.ticket != Some(ticket) {
                return;
            }
            match &result {
                Ok(()) => {
                    state.draft.reset();
                    state.error = None;
                }
                Err(e) => state.error = Some(e.to_string()),
            }
        });
        result
    }

    async fn send(&self, facility: FacilityId, draft: &ReviewDraft) -> Result<(), CoreError> {
        let score = draft.validate()?;
        let toilet_id = facility.as_server().ok_or_else(|| {
            CoreError::validation(format!("facility {facility} has no backend id yet"))
        })?;
        let (_, token) = self.guard.require()?;

        let review = NewReview {
            toilet_id,
            title: draft.title.trim().to_owned(),
            review_text: draft.body.trim().to_owned(),
            score,
        };
        self.client
            .add_review(&token, &review)
            .await
            .map_err(|e| self.guard.translate(e))?;
        debug!(%facility, score, "review submitted");
        Ok(())
    }
}
