//! Message types for the roster manager actor.
//!
//! Every request carries a `oneshot` reply channel, so callers observe the
//! outcome of exactly the operation they sent.

use crate::auth::{GrantOutcome, RevokeOutcome};
use crate::roster::{EventConfig, JoinOutcome, LeaveOutcome, Member, RosterSnapshot};
use common::types::{Handle, UserId};
use tokio::sync::oneshot;

/// Messages sent to `RosterManagerActor`.
#[derive(Debug)]
pub enum RosterMessage {
    /// Add a member to the main list or the waitlist.
    Join {
        member: Member,
        respond_to: oneshot::Sender<JoinOutcome>,
    },

    /// Remove a member, promoting from the waitlist on a main-list departure.
    Leave {
        id: UserId,
        respond_to: oneshot::Sender<LeaveOutcome>,
    },

    /// Overwrite capacity, venue and date.
    SetEventDetails {
        event: EventConfig,
        respond_to: oneshot::Sender<()>,
    },

    /// Empty both lists.
    ClearRoster { respond_to: oneshot::Sender<()> },

    GrantAdmin {
        handle: Handle,
        respond_to: oneshot::Sender<GrantOutcome>,
    },

    RevokeAdmin {
        handle: Handle,
        respond_to: oneshot::Sender<RevokeOutcome>,
    },

    GrantSuperAdmin {
        handle: Handle,
        respond_to: oneshot::Sender<GrantOutcome>,
    },

    RevokeSuperAdmin {
        handle: Handle,
        respond_to: oneshot::Sender<RevokeOutcome>,
    },

    IsAdmin {
        id: Option<UserId>,
        handle: Option<Handle>,
        respond_to: oneshot::Sender<bool>,
    },

    IsSuperAdmin {
        id: Option<UserId>,
        handle: Option<Handle>,
        respond_to: oneshot::Sender<bool>,
    },

    /// List plain admin handles (sorted).
    ListAdmins {
        respond_to: oneshot::Sender<Vec<Handle>>,
    },

    /// Render the roster as text.
    FormatRoster { respond_to: oneshot::Sender<String> },

    /// Copy of the current roster (for tests and diagnostics).
    GetSnapshot {
        respond_to: oneshot::Sender<RosterSnapshot>,
    },
}
