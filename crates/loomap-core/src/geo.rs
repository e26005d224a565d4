// ── Device position ──
//
// One-shot acquisition of the user's coordinates from a pluggable
// platform location service. The first activation issues exactly one
// request; later activations reuse its outcome. Only an explicit
// `request()` asks the platform again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Facility, GeoPosition};

// ── Location service ────────────────────────────────────────────────

/// Why no position could be acquired. Both render the same way to a
/// user but stay distinguishable here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The platform has no location capability at all.
    #[error("location unavailable")]
    Unavailable,
    /// Denied, timed out, or lost the signal.
    #[error("acquisition failed: {0}")]
    Failed(String),
}

impl From<LocationError> for CoreError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Unavailable => CoreError::GeolocationUnavailable,
            LocationError::Failed(reason) => CoreError::GeolocationFailed { reason },
        }
    }
}

/// The platform's source of device coordinates.
pub trait LocationService: Send + Sync {
    fn current_position(&self) -> BoxFuture<'_, Result<GeoPosition, LocationError>>;
}

/// A location service that always answers the same way.
///
/// `None` models a platform without location support. Used by the CLI,
/// where the "device position" is whatever the profile configures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocation {
    position: Option<GeoPosition>,
}

impl StaticLocation {
    pub fn new(position: Option<GeoPosition>) -> Self {
        Self { position }
    }

    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

impl LocationService for StaticLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<GeoPosition, LocationError>> {
        let result = self.position.ok_or(LocationError::Unavailable);
        async move { result }.boxed()
    }
}

// ── Provider state ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum GeoState {
    /// Not activated yet.
    Idle,
    Pending,
    Located(GeoPosition),
    Failed(LocationError),
}

impl GeoState {
    pub fn position(&self) -> Option<GeoPosition> {
        match self {
            Self::Located(pos) => Some(*pos),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LocationError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

// ── GeoPositionProvider ─────────────────────────────────────────────

pub struct GeoPositionProvider {
    service: Arc<dyn LocationService>,
    state: watch::Sender<GeoState>,
    activated: AtomicBool,
    /// Bumped per request; a response only lands if it is still current.
    generation: AtomicU64,
}

impl GeoPositionProvider {
    pub fn new(service: Arc<dyn LocationService>) -> Self {
        let (state, _) = watch::channel(GeoState::Idle);
        Self {
            service,
            state,
            activated: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> GeoState {
        self.state.borrow().clone()
    }

    pub fn position(&self) -> Option<GeoPosition> {
        self.state.borrow().position()
    }

    pub fn subscribe(&self) -> watch::Receiver<GeoState> {
        self.state.subscribe()
    }

    /// First call issues the one automatic request; later calls return
    /// whatever that request produced (or `Pending`) without asking the
    /// platform again.
    pub async fn activate(&self, cancel: &CancellationToken) -> GeoState {
        if self.activated.swap(true, Ordering::AcqRel) {
            return self.state();
        }
        // The outcome is published through `state`.
        let _ = self.run(cancel).await;
        self.state()
    }

    /// Explicit re-request. Always a fresh platform call, no retries.
    pub async fn request(&self, cancel: &CancellationToken) -> Result<GeoPosition, LocationError> {
        self.activated.store(true, Ordering::Release);
        self.run(cancel).await
    }

    /// Spawn the automatic activation in the background so rendering
    /// never waits on it.
    pub fn spawn_activate(self: &Arc<Self>, cancel: CancellationToken) {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            provider.activate(&cancel).await;
        });
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<GeoPosition, LocationError> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_replace(GeoState::Pending);
        debug!(generation, "requesting device position");

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(generation, "position request abandoned");
                // Nothing acquired; the next activation asks again.
                if self.generation.load(Ordering::Acquire) == generation {
                    self.state.send_replace(GeoState::Idle);
                    self.activated.store(false, Ordering::Release);
                }
                return Err(LocationError::Failed("cancelled".into()));
            }
            result = self.service.current_position() => result,
        };

        if self.generation.load(Ordering::Acquire) != generation {
            debug!(generation, "discarding superseded position result");
            return result;
        }

        match &result {
            Ok(pos) => {
                debug!(%pos, "device position acquired");
                self.state.send_replace(GeoState::Located(*pos));
            }
            Err(err) => {
                warn!(error = %err, "device position unavailable");
                self.state.send_replace(GeoState::Failed(err.clone()));
            }
        }
        result
    }
}

// ── Map centering ───────────────────────────────────────────────────

/// Where the map should be centered right now: the device position once
/// known, otherwise the first renderable facility, otherwise `default`.
pub fn map_center(
    position: Option<GeoPosition>,
    facilities: &[Arc<Facility>],
    default: GeoPosition,
) -> GeoPosition {
    position
        .or_else(|| facilities.iter().find_map(|f| f.location()))
        .unwrap_or(default)
}
