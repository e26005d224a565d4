// ── Facility store ──
//
// Client-side cache of facilities. Adds are applied as soon as the
// backend answers, overlaying its response onto the draft. Deletes are
// confirm-then-apply: the entry only leaves the collection after the
// backend acknowledged the deletion.

mod collection;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use loomap_api::BackendClient;
use loomap_api::models::Toilet;

use crate::convert;
use crate::error::CoreError;
use crate::model::{Facility, FacilityDraft, FacilityId};
use crate::session::{Session, TokenGuard};
use crate::stream::FacilityStream;

use self::collection::FacilityCollection;

pub struct FacilityStore {
    client: BackendClient,
    guard: TokenGuard,
    facilities: FacilityCollection,
    /// Store-level error banner from the last failed load.
    error: watch::Sender<Option<String>>,
}

impl FacilityStore {
    pub fn new(client: BackendClient, guard: TokenGuard) -> Self {
        let (error, _) = watch::channel(None);
        Self {
            client,
            guard,
            facilities: FacilityCollection::new(),
            error,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch the full collection, replacing whatever was cached.
    ///
    /// On failure the store error is set and the collection is left
    /// empty; nothing from a partial response is kept.
    pub async fn load(&self) -> Result<Arc<Vec<Arc<Facility>>>, CoreError> {
        let bearer = self.guard.bearer();
        match self.client.list_toilets(bearer.as_ref()).await {
            Ok(toilets) => {
                let facilities: Vec<Facility> = toilets.into_iter().map(Facility::from).collect();
                info!(count = facilities.len(), "facilities loaded");
                self.facilities.replace_all(facilities);
                self.error.send_replace(None);
                Ok(self.facilities.snapshot())
            }
            Err(e) => {
                let err = self.guard.translate(e);
                warn!(error = %err, "failed to load facilities");
                self.facilities.clear();
                self.error.send_replace(Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Everything in the collection, in insertion order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Facility>>> {
        self.facilities.snapshot()
    }

    /// The entries a map may draw: those with a parseable location.
    ///
    /// Malformed entries are skipped with a warning but stay in the
    /// collection.
    pub fn renderable(&self) -> Vec<Arc<Facility>> {
        self.facilities
            .snapshot()
            .iter()
            .filter(|f| {
                let ok = f.is_renderable();
                if !ok {
                    warn!(id = %f.id, point = %f.point, "skipping facility with malformed point");
                }
                ok
            })
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &FacilityId) -> Option<Arc<Facility>> {
        self.facilities.get(id)
    }

    /// The last load error, if the last load failed.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn subscribe(&self) -> FacilityStream {
        FacilityStream::new(self.facilities.subscribe())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create a facility on the backend and append the result.
    ///
    /// Nothing is appended unless the backend accepted the request.
    pub async fn add(&self, draft: &FacilityDraft) -> Result<Arc<Facility>, CoreError> {
        if draft.name.trim().is_empty() {
            return Err(CoreError::validation("facility name must not be empty"));
        }
        if !draft.location.is_finite() {
            return Err(CoreError::validation(format!(
                "location {} is not a finite coordinate pair",
                draft.location
            )));
        }
        let (session, token) = self.guard.require()?;

        let body = convert::new_toilet(draft);
        let created = self
            .client
            .add_toilet(&token, &body)
            .await
            .map_err(|e| self.guard.translate(e))?;

        Ok(self.add_optimistic(draft, created, Some(session.subject)))
    }

    /// Overlay a backend response onto the draft and append it.
    ///
    /// Fields present in `created` win; absent ones fall back to the
    /// draft, and the owner to `subject`. A missing id yields a local
    /// placeholder.
    pub fn add_optimistic(
        &self,
        draft: &FacilityDraft,
        created: Toilet,
        subject: Option<i64>,
    ) -> Arc<Facility> {
        let facility = convert::overlay_created(draft, created, subject);
        debug!(id = %facility.id, point = %facility.point, "facility added");
        self.facilities.append(facility)
    }

    /// Delete on the backend, then drop the entry locally.
    ///
    /// A failed deletion leaves the collection untouched.
    pub async fn remove(&self, id: &FacilityId) -> Result<(), CoreError> {
        if self.facilities.get(id).is_none() {
            return Err(CoreError::NotFound {
                identifier: id.to_string(),
            });
        }
        let Some(server_id) = id.as_server() else {
            return Err(CoreError::validation(format!(
                "facility {id} has no backend id and cannot be deleted"
            )));
        };
        let (_, token) = self.guard.require()?;

        self.client
            .delete_toilet(&token, server_id)
            .await
            .map_err(|e| self.guard.translate(e))?;

        self.facilities.remove(id);
        debug!(%id, "facility removed");
        Ok(())
    }

    /// Drop every cached facility (full reload / logout).
    pub fn clear(&self) {
        self.facilities.clear();
        self.error.send_replace(None);
    }

    // ── Ownership ────────────────────────────────────────────────────

    /// Whether `session` created `facility`. Advisory only: it decides
    /// whether to offer deletion, the backend decides whether to allow it.
    pub fn is_owner(facility: &Facility, session: &Session) -> bool {
        facility.owner == Some(session.subject)
    }
}
