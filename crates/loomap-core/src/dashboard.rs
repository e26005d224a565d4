// ── Dashboard facade ──
//
// Wires the session guard, position provider, geocoder, facility store,
// modal workflow and review panel into the authenticated map screen.
// Shutting the dashboard down plays the role of unmounting: anything
// still in flight is dropped before it can touch shared state.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use loomap_api::{BackendClient, GeocodingClient};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::geo::{self, GeoPositionProvider, LocationService};
use crate::geocode::ReverseGeocoder;
use crate::model::{Facility, FacilityId, GeoPosition};
use crate::reviews::ReviewPanel;
use crate::session::{CredentialStore, Session, TokenGuard};
use crate::store::FacilityStore;
use crate::stream::FacilityStream;
use crate::workflow::{ModalTicket, ModalWorkflow};

/// Pointer input on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Click on empty map.
    Click(GeoPosition),
    /// Click on an existing facility's marker.
    MarkerClick(FacilityId),
}

/// A modal opened in response to a map event.
#[derive(Debug)]
pub struct OpenedModal {
    pub ticket: ModalTicket,
    /// Background address lookup for an add form, if a geocoder is set.
    /// Awaiting it is optional; the form is usable immediately.
    pub address_lookup: Option<JoinHandle<()>>,
}

/// The authenticated map screen.
///
/// Cheaply cloneable via `Arc<DashboardInner>`.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: ClientConfig,
    client: BackendClient,
    guard: TokenGuard,
    geo: Arc<GeoPositionProvider>,
    geocoder: ReverseGeocoder,
    store: FacilityStore,
    modal: ModalWorkflow,
    reviews: ReviewPanel,
    cancel: CancellationToken,
}

impl Dashboard {
    /// Build HTTP clients from `config` and assemble the dashboard.
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        location: Arc<dyn LocationService>,
    ) -> Result<Self, CoreError> {
        let transport = config.transport();
        let client = BackendClient::new(config.api_url.clone(), &transport)?;
        let geocoder = match &config.geocoder {
            Some(gc) => ReverseGeocoder::new(GeocodingClient::new(
                gc.url.clone(),
                gc.api_key.clone(),
                &transport,
            )?),
            None => ReverseGeocoder::disabled(),
        };
        Ok(Self::with_clients(
            config,
            client,
            geocoder,
            credentials,
            location,
        ))
    }

    /// Assemble from pre-built clients.
    pub fn with_clients(
        config: ClientConfig,
        client: BackendClient,
        geocoder: ReverseGeocoder,
        credentials: Arc<dyn CredentialStore>,
        location: Arc<dyn LocationService>,
    ) -> Self {
        let guard = TokenGuard::new(credentials);
        Self {
            inner: Arc::new(DashboardInner {
                store: FacilityStore::new(client.clone(), guard.clone()),
                reviews: ReviewPanel::new(client.clone(), guard.clone()),
                geo: Arc::new(GeoPositionProvider::new(location)),
                modal: ModalWorkflow::new(),
                cancel: CancellationToken::new(),
                config,
                client,
                guard,
                geocoder,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn guard(&self) -> &TokenGuard {
        &self.inner.guard
    }

    pub fn store(&self) -> &FacilityStore {
        &self.inner.store
    }

    pub fn modal(&self) -> &ModalWorkflow {
        &self.inner.modal
    }

    pub fn reviews(&self) -> &ReviewPanel {
        &self.inner.reviews
    }

    pub fn geo(&self) -> &Arc<GeoPositionProvider> {
        &self.inner.geo
    }

    pub fn geocoder(&self) -> &ReverseGeocoder {
        &self.inner.geocoder
    }

    pub fn subscribe_facilities(&self) -> FacilityStream {
        self.inner.store.subscribe()
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<Session> {
        self.inner.guard.current_session()
    }

    /// The current session, or `AuthExpired` (go to login).
    pub fn require_session(&self) -> Result<Session, CoreError> {
        self.inner.guard.require().map(|(session, _)| session)
    }

    /// Exchange credentials for a session and store the credential.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Session, CoreError> {
        validate_login(username, password)?;
        let token = self.inner.client.login(username.trim(), password).await?;
        let session = self.inner.guard.establish(&token)?;
        info!(subject = session.subject, "logged in");
        Ok(session)
    }

    pub async fn register(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        validate_login(username, password)?;
        self.inner.client.register(username.trim(), password).await?;
        info!(username = username.trim(), "account registered");
        Ok(())
    }

    /// Drop the credential and every piece of per-user state.
    pub fn logout(&self) {
        self.inner.guard.invalidate();
        self.close_modal();
        self.inner.store.clear();
        info!("logged out");
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Enter the map screen: check the session, start the one automatic
    /// position request in the background, and load facilities.
    ///
    /// A failed load is not an error here; it shows up as
    /// [`FacilityStore::error`]. Only a missing session is.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.require_session()?;
        self.inner.geo.spawn_activate(self.inner.cancel.child_token());

        match self.until_shutdown(self.inner.store.load()).await? {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth_expired() => Err(e),
            Err(_) => Ok(()),
        }
    }

    /// Stop accepting late results. In-flight work is discarded.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.close_modal();
        debug!("dashboard shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Device position if known, else the first facility, else the
    /// configured default.
    pub fn map_center(&self) -> GeoPosition {
        geo::map_center(
            self.inner.geo.position(),
            &self.inner.store.renderable(),
            self.inner.config.default_center,
        )
    }

    // ── Map events ───────────────────────────────────────────────────

    pub async fn handle_map_event(&self, event: MapEvent) -> Result<OpenedModal, CoreError> {
        self.require_session()?;
        match event {
            MapEvent::Click(pos) if !pos.is_finite() => Err(CoreError::validation(format!(
                "clicked position {pos} is not a finite coordinate pair"
            ))),
            MapEvent::Click(pos) => Ok(self.open_add(pos)),
            MapEvent::MarkerClick(id) => self.open_view(&id).await,
        }
    }

    fn open_add(&self, pos: GeoPosition) -> OpenedModal {
        self.inner.reviews.leave();
        let ticket = self.inner.modal.open_add(pos);

        let address_lookup = self.inner.geocoder.is_enabled().then(|| {
            let this = self.clone();
            tokio::spawn(async move {
                let resolved = tokio::select! {
                    biased;
                    () = this.inner.cancel.cancelled() => return,
                    address = this.inner.geocoder.resolve(pos) => address,
                };
                if let Some(address) = resolved {
                    this.inner.modal.patch_address(ticket, address);
                }
            })
        });

        OpenedModal {
            ticket,
            address_lookup,
        }
    }

    async fn open_view(&self, id: &FacilityId) -> Result<OpenedModal, CoreError> {
        let facility = self.inner.store.get(id).ok_or_else(|| CoreError::NotFound {
            identifier: id.to_string(),
        })?;
        let ticket = self.inner.modal.open_view(facility);

        // Dropped with the rest if the dashboard shuts down mid-fetch.
        self.until_shutdown(self.inner.reviews.enter(ticket, *id))
            .await?;

        Ok(OpenedModal {
            ticket,
            address_lookup: None,
        })
    }

    // ── Modal actions ────────────────────────────────────────────────

    /// Submit the add form `ticket` names.
    ///
    /// On success the facility is in the store and the modal closes. On
    /// failure the modal stays open with an inline error.
    pub async fn submit_add(&self, ticket: ModalTicket) -> Result<Arc<Facility>, CoreError> {
        let form = self
            .inner
            .modal
            .add_form()
            .filter(|f| f.ticket == ticket)
            .ok_or(CoreError::NoActiveModal)?;

        let result = self
            .until_shutdown(self.inner.store.add(&form.draft))
            .await?;
        self.settle(ticket, result)
    }

    /// Submit the review draft for the view modal `ticket` names.
    pub async fn submit_review(&self, ticket: ModalTicket) -> Result<(), CoreError> {
        let result = self
            .until_shutdown(self.inner.reviews.submit(ticket))
            .await?;
        match result {
            // The panel shows validation errors itself.
            Err(e @ CoreError::ValidationFailed { .. }) => Err(e),
            other => self.settle(ticket, other),
        }
    }

    /// Delete the facility shown by the view modal `ticket` names.
    ///
    /// Callers are expected to have confirmed with the user first.
    pub async fn delete_active(&self, ticket: ModalTicket) -> Result<(), CoreError> {
        let view = self
            .inner
            .modal
            .viewing()
            .filter(|v| v.ticket == ticket)
            .ok_or(CoreError::NoActiveModal)?;

        let result = self
            .until_shutdown(self.inner.store.remove(&view.facility.id))
            .await?;
        self.settle(ticket, result)
    }

    /// Escape/cancel: close whatever is open, no store mutation.
    pub fn cancel(&self) -> bool {
        self.close_modal()
    }

    /// Whether to offer deletion of `facility` to the current user.
    pub fn can_delete(&self, facility: &Facility) -> bool {
        self.session()
            .is_some_and(|s| FacilityStore::is_owner(facility, &s))
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn close_modal(&self) -> bool {
        self.inner.reviews.leave();
        self.inner.modal.cancel()
    }

    /// Close on success; on failure show the error inline, except an
    /// expired session, which closes the modal and goes to login.
    fn settle<T>(&self, ticket: ModalTicket, result: Result<T, CoreError>) -> Result<T, CoreError> {
        match &result {
            Ok(_) => {
                if self.inner.modal.close(ticket) {
                    self.inner.reviews.leave();
                }
            }
            Err(e) if e.is_auth_expired() => {
                self.close_modal();
            }
            Err(e) => {
                self.inner.modal.set_error(ticket, e.to_string());
            }
        }
        result
    }

    /// Run `fut` unless the dashboard shuts down first, in which case the
    /// future is dropped unfinished and nothing it would have applied is.
    async fn until_shutdown<F: Future>(&self, fut: F) -> Result<F::Output, CoreError> {
        tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => {
                debug!("dashboard shut down, discarding in-flight work");
                Err(CoreError::Internal("dashboard is shut down".into()))
            }
            out = fut => Ok(out),
        }
    }
}

fn validate_login(username: &str, password: &SecretString) -> Result<(), CoreError> {
    if username.trim().is_empty() {
        return Err(CoreError::validation("username must not be empty"));
    }
    if password.expose_secret().is_empty() {
        return Err(CoreError::validation("password must not be empty"));
    }
    Ok(())
}
