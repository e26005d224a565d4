// ── Modal workflow ──
//
// Serializes "add facility" and "view facility" interactions into a
// single modal. Every open hands out a `ModalTicket`; late results
// (addresses, submissions, errors) must present the ticket of the modal
// they were started for and are dropped if that modal is gone.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::model::{Facility, FacilityDraft, GeoPosition};

/// Identity of one opened modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalTicket(u64);

impl fmt::Display for ModalTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The add-facility form.
#[derive(Debug, Clone, PartialEq)]
pub struct AddForm {
    pub ticket: ModalTicket,
    pub draft: FacilityDraft,
    /// Inline error from the last failed submission.
    pub error: Option<String>,
}

/// The view/review/delete panel for one facility.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    pub ticket: ModalTicket,
    pub facility: Arc<Facility>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    AddPending(AddForm),
    Viewing(ViewContext),
}

impl ModalState {
    pub fn ticket(&self) -> Option<ModalTicket> {
        match self {
            Self::Closed => None,
            Self::AddPending(form) => Some(form.ticket),
            Self::Viewing(view) => Some(view.ticket),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::AddPending(_) => "add",
            Self::Viewing(_) => "view",
        }
    }
}

/// Finite-state controller for the one visible modal.
pub struct ModalWorkflow {
    state: watch::Sender<ModalState>,
    next_ticket: AtomicU64,
}

impl Default for ModalWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalWorkflow {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ModalState::Closed);
        Self {
            state,
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn state(&self) -> ModalState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }

    /// Whether `ticket` still names the open modal.
    pub fn is_current(&self, ticket: ModalTicket) -> bool {
        self.state.borrow().ticket() == Some(ticket)
    }

    pub fn add_form(&self) -> Option<AddForm> {
        match &*self.state.borrow() {
            ModalState::AddPending(form) => Some(form.clone()),
            _ => None,
        }
    }

    pub fn viewing(&self) -> Option<ViewContext> {
        match &*self.state.borrow() {
            ModalState::Viewing(view) => Some(view.clone()),
            _ => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Open the add form at `location` (map click off any marker).
    ///
    /// Any open modal is closed first; the address, if one is found,
    /// arrives later through [`patch_address`](Self::patch_address).
    pub fn open_add(&self, location: GeoPosition) -> ModalTicket {
        let ticket = self.issue_ticket();
        self.replace(ModalState::AddPending(AddForm {
            ticket,
            draft: FacilityDraft::new(location),
            error: None,
        }));
        ticket
    }

    /// Open the view panel for `facility` (marker click).
    pub fn open_view(&self, facility: Arc<Facility>) -> ModalTicket {
        let ticket = self.issue_ticket();
        self.replace(ModalState::Viewing(ViewContext {
            ticket,
            facility,
            error: None,
        }));
        ticket
    }

    /// Close whatever is open. Never touches the store.
    /// Returns `false` if nothing was open.
    pub fn cancel(&self) -> bool {
        let previous = self.state.send_replace(ModalState::Closed);
        if previous.is_open() {
            debug!(modal = previous.label(), "modal cancelled");
        }
        previous.is_open()
    }

    /// Close the modal only if it is still the one `ticket` names.
    pub fn close(&self, ticket: ModalTicket) -> bool {
        let closed = self.state.send_if_modified(|state| {
            if state.ticket() == Some(ticket) {
                *state = ModalState::Closed;
                true
            } else {
                false
            }
        });
        if closed {
            debug!(%ticket, "modal closed");
        }
        closed
    }

    // ── Patches ──────────────────────────────────────────────────────

    /// Fill in a late-arriving address without touching anything the
    /// user has entered. Dropped if the add form was closed or replaced.
    pub fn patch_address(&self, ticket: ModalTicket, address: String) -> bool {
        self.edit_add(ticket, |draft| {
            if draft.address.is_none() {
                draft.address = Some(address);
            }
        })
    }

    /// Apply user input to the add form's draft.
    pub fn edit_add(&self, ticket: ModalTicket, edit: impl FnOnce(&mut FacilityDraft)) -> bool {
        let applied = self.state.send_if_modified(|state| match state {
            ModalState::AddPending(form) if form.ticket == ticket => {
                edit(&mut form.draft);
                true
            }
            _ => false,
        });
        if !applied {
            debug!(%ticket, "add form gone, edit dropped");
        }
        applied
    }

    /// Show an inline error on the modal `ticket` names.
    pub fn set_error(&self, ticket: ModalTicket, message: impl Into<String>) -> bool {
        let message = message.into();
        self.state.send_if_modified(|state| match state {
            ModalState::AddPending(form) if form.ticket == ticket => {
                form.error = Some(message);
                true
            }
            ModalState::Viewing(view) if view.ticket == ticket => {
                view.error = Some(message);
                true
            }
            _ => false,
        })
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn issue_ticket(&self) -> ModalTicket {
        ModalTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Swap in a new modal. The old payload is dropped in the same
    /// update, so no observer ever sees two.
    fn replace(&self, next: ModalState) {
        let label = next.label();
        let ticket = next.ticket();
        let previous = self.state.send_replace(next);
        if previous.is_open() {
            debug!(closed = previous.label(), opened = label, "replacing open modal");
        }
        debug!(?ticket, modal = label, "modal opened");
    }
}
