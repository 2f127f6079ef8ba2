//! `RosterManagerActor` - single owner of the roster and authorization state.
//!
//! The actor processes one message at a time, so each operation's
//! read-modify-write runs as one indivisible step. Two concurrent joins can
//! never both see a free slot.
//!
//! The admin store is never touched from inside the actor. Grants and revokes
//! update memory in the actor, reply, and the handle then mirrors the change
//! to the store from the caller's task. A slow or unreachable store delays
//! that caller and later grants/revokes, never other roster operations.
//!
//! Grants and revokes hold `admin_writes` across the actor call and the store
//! write, so the store sees admin changes in the same order as memory does.

use crate::auth::{AdminRegistry, GrantOutcome, RevokeOutcome, SuperAdminSeed};
use crate::errors::RosterError;
use crate::roster::{EventConfig, JoinOutcome, LeaveOutcome, Member, Roster, RosterSnapshot};
use crate::store::AdminStore;

use super::messages::RosterMessage;

use common::types::{Handle, UserId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default channel buffer size for the manager mailbox.
const MANAGER_CHANNEL_BUFFER: usize = 256;

/// Startup state for the manager.
#[derive(Debug, Clone, Default)]
pub struct ManagerSettings {
    /// Initial event configuration.
    pub event: EventConfig,
    /// Operator-configured super-admins.
    pub seed: SuperAdminSeed,
}

/// Handle to the `RosterManagerActor`.
///
/// Cheap to clone; every transport task gets its own copy.
#[derive(Clone)]
pub struct RosterManagerHandle {
    sender: mpsc::Sender<RosterMessage>,
    cancel_token: CancellationToken,
    store: Arc<dyn AdminStore>,
    admin_writes: Arc<Mutex<()>>,
}

impl RosterManagerHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RosterMessage,
    ) -> Result<T, RosterError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|e| RosterError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RosterError::Internal(format!("response receive failed: {e}")))
    }

    /// Join the roster. `handle` is stored as given (without a leading `@`).
    pub async fn join(
        &self,
        id: UserId,
        display_name: impl Into<String>,
        handle: impl Into<String>,
    ) -> Result<JoinOutcome, RosterError> {
        let handle: String = handle.into();
        let member = Member::new(
            id,
            display_name,
            handle.trim().trim_start_matches('@').to_string(),
        );
        self.request(|respond_to| RosterMessage::Join { member, respond_to })
            .await
    }

    pub async fn leave(&self, id: UserId) -> Result<LeaveOutcome, RosterError> {
        self.request(|respond_to| RosterMessage::Leave { id, respond_to })
            .await
    }

    /// Overwrite event details. Callers must check `is_admin` first.
    pub async fn set_event_details(
        &self,
        capacity: u32,
        venue: impl Into<String>,
        date: impl Into<String>,
    ) -> Result<(), RosterError> {
        let event = EventConfig {
            capacity,
            venue: venue.into(),
            date: date.into(),
        };
        self.request(|respond_to| RosterMessage::SetEventDetails { event, respond_to })
            .await
    }

    /// Empty the roster. Callers must check `is_admin` first.
    pub async fn clear_roster(&self) -> Result<(), RosterError> {
        self.request(|respond_to| RosterMessage::ClearRoster { respond_to })
            .await
    }

    /// Grant admin to a handle, then mirror it to the admin store.
    ///
    /// The in-memory grant stands even if the store write fails.
    pub async fn grant_admin(&self, raw_handle: &str) -> Result<GrantOutcome, RosterError> {
        let handle = Handle::parse(raw_handle)?;
        let _write_guard = self.admin_writes.lock().await;
        let outcome = self
            .request(|respond_to| RosterMessage::GrantAdmin {
                handle: handle.clone(),
                respond_to,
            })
            .await?;

        // Upsert even when already granted; it heals a store that missed
        // an earlier write.
        if let Err(e) = self.store.upsert(&handle).await {
            warn!(
                target: "roster.actor.manager",
                error = %e,
                "Admin grant kept in memory but not persisted"
            );
        }

        Ok(outcome)
    }

    /// Revoke admin from a handle. Seed super-admins are refused.
    pub async fn revoke_admin(&self, raw_handle: &str) -> Result<RevokeOutcome, RosterError> {
        let handle = Handle::parse(raw_handle)?;
        let _write_guard = self.admin_writes.lock().await;
        let outcome = self
            .request(|respond_to| RosterMessage::RevokeAdmin {
                handle: handle.clone(),
                respond_to,
            })
            .await?;

        if outcome == RevokeOutcome::Revoked {
            if let Err(e) = self.store.remove(&handle).await {
                warn!(
                    target: "roster.actor.manager",
                    error = %e,
                    "Admin revoke applied in memory but not persisted"
                );
            }
        }

        Ok(outcome)
    }

    /// Grant super-admin to a handle (in memory only).
    pub async fn grant_super_admin(&self, raw_handle: &str) -> Result<GrantOutcome, RosterError> {
        let handle = Handle::parse(raw_handle)?;
        self.request(|respond_to| RosterMessage::GrantSuperAdmin { handle, respond_to })
            .await
    }

    /// Revoke a runtime-granted super-admin. Seed super-admins are refused.
    pub async fn revoke_super_admin(
        &self,
        raw_handle: &str,
    ) -> Result<RevokeOutcome, RosterError> {
        let handle = Handle::parse(raw_handle)?;
        self.request(|respond_to| RosterMessage::RevokeSuperAdmin { handle, respond_to })
            .await
    }

    pub async fn is_admin(
        &self,
        id: Option<UserId>,
        handle: Option<&Handle>,
    ) -> Result<bool, RosterError> {
        let handle = handle.cloned();
        self.request(|respond_to| RosterMessage::IsAdmin {
            id,
            handle,
            respond_to,
        })
        .await
    }

    pub async fn is_super_admin(
        &self,
        id: Option<UserId>,
        handle: Option<&Handle>,
    ) -> Result<bool, RosterError> {
        let handle = handle.cloned();
        self.request(|respond_to| RosterMessage::IsSuperAdmin {
            id,
            handle,
            respond_to,
        })
        .await
    }

    pub async fn list_admins(&self) -> Result<Vec<Handle>, RosterError> {
        self.request(|respond_to| RosterMessage::ListAdmins { respond_to })
            .await
    }

    pub async fn format_roster(&self) -> Result<String, RosterError> {
        self.request(|respond_to| RosterMessage::FormatRoster { respond_to })
            .await
    }

    pub async fn snapshot(&self) -> Result<RosterSnapshot, RosterError> {
        self.request(|respond_to| RosterMessage::GetSnapshot { respond_to })
            .await
    }

    /// Cancel the manager actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// The `RosterManagerActor` implementation.
pub struct RosterManagerActor {
    receiver: mpsc::Receiver<RosterMessage>,
    cancel_token: CancellationToken,
    roster: Roster,
    admins: AdminRegistry,
    messages_processed: u64,
}

impl RosterManagerActor {
    /// Load admins from the store and spawn the actor.
    ///
    /// A store that cannot be read yields an empty admin set; startup
    /// continues.
    pub async fn spawn(
        settings: ManagerSettings,
        store: Arc<dyn AdminStore>,
        cancel_token: CancellationToken,
    ) -> (RosterManagerHandle, JoinHandle<()>) {
        let admins = match store.load_all().await {
            Ok(admins) => {
                info!(
                    target: "roster.actor.manager",
                    admins = admins.len(),
                    "Loaded admins from store"
                );
                admins
            }
            Err(e) => {
                warn!(
                    target: "roster.actor.manager",
                    error = %e,
                    "Admin store unavailable at startup, starting with no admins"
                );
                Vec::new()
            }
        };

        let (sender, receiver) = mpsc::channel(MANAGER_CHANNEL_BUFFER);

        let actor = Self {
            receiver,
            cancel_token: cancel_token.clone(),
            roster: Roster::new(settings.event),
            admins: AdminRegistry::new(settings.seed, admins),
            messages_processed: 0,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = RosterManagerHandle {
            sender,
            cancel_token,
            store,
            admin_writes: Arc::new(Mutex::new(())),
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "roster.actor.manager")]
    async fn run(mut self) {
        info!(target: "roster.actor.manager", "RosterManagerActor started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "roster.actor.manager",
                        "RosterManagerActor received cancellation signal"
                    );
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message);
                            self.messages_processed += 1;
                        }
                        None => {
                            info!(
                                target: "roster.actor.manager",
                                "RosterManagerActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "roster.actor.manager",
            main_list = self.roster.main_len(),
            wait_list = self.roster.wait_len(),
            messages_processed = self.messages_processed,
            "RosterManagerActor stopped"
        );
    }

    /// Handle a single message. Reply send failures mean the caller went
    /// away; the state change still stands.
    fn handle_message(&mut self, message: RosterMessage) {
        match message {
            RosterMessage::Join { member, respond_to } => {
                let _ = respond_to.send(self.handle_join(member));
            }

            RosterMessage::Leave { id, respond_to } => {
                let _ = respond_to.send(self.handle_leave(id));
            }

            RosterMessage::SetEventDetails { event, respond_to } => {
                info!(
                    target: "roster.actor.manager",
                    capacity = event.capacity,
                    confirmed = self.roster.main_len(),
                    "Event details updated"
                );
                self.roster.set_event_details(event);
                let _ = respond_to.send(());
            }

            RosterMessage::ClearRoster { respond_to } => {
                info!(
                    target: "roster.actor.manager",
                    confirmed = self.roster.main_len(),
                    waitlisted = self.roster.wait_len(),
                    "Roster cleared"
                );
                self.roster.clear();
                let _ = respond_to.send(());
            }

            RosterMessage::GrantAdmin { handle, respond_to } => {
                let outcome = self.admins.grant_admin(handle.clone());
                info!(target: "roster.actor.manager", handle = %handle, ?outcome, "Grant admin");
                let _ = respond_to.send(outcome);
            }

            RosterMessage::RevokeAdmin { handle, respond_to } => {
                let outcome = self.admins.revoke_admin(&handle);
                if outcome == RevokeOutcome::Protected {
                    warn!(
                        target: "roster.actor.manager",
                        handle = %handle,
                        "Refused to revoke seed super-admin"
                    );
                } else {
                    info!(target: "roster.actor.manager", handle = %handle, ?outcome, "Revoke admin");
                }
                let _ = respond_to.send(outcome);
            }

            RosterMessage::GrantSuperAdmin { handle, respond_to } => {
                let outcome = self.admins.grant_super_admin(handle.clone());
                info!(target: "roster.actor.manager", handle = %handle, ?outcome, "Grant super-admin");
                let _ = respond_to.send(outcome);
            }

            RosterMessage::RevokeSuperAdmin { handle, respond_to } => {
                let outcome = self.admins.revoke_super_admin(&handle);
                info!(target: "roster.actor.manager", handle = %handle, ?outcome, "Revoke super-admin");
                let _ = respond_to.send(outcome);
            }

            RosterMessage::IsAdmin {
                id,
                handle,
                respond_to,
            } => {
                let _ = respond_to.send(self.admins.is_admin(id, handle.as_ref()));
            }

            RosterMessage::IsSuperAdmin {
                id,
                handle,
                respond_to,
            } => {
                let _ = respond_to.send(self.admins.is_super_admin(id, handle.as_ref()));
            }

            RosterMessage::ListAdmins { respond_to } => {
                let _ = respond_to.send(self.admins.admins());
            }

            RosterMessage::FormatRoster { respond_to } => {
                let _ = respond_to.send(self.roster.format());
            }

            RosterMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.roster.snapshot());
            }
        }
    }

    fn handle_join(&mut self, member: Member) -> JoinOutcome {
        let user_id = member.id;
        let outcome = self.roster.join(member);

        debug!(
            target: "roster.actor.manager",
            user_id = %user_id,
            ?outcome,
            confirmed = self.roster.main_len(),
            waitlisted = self.roster.wait_len(),
            "Join processed"
        );

        outcome
    }

    fn handle_leave(&mut self, id: UserId) -> LeaveOutcome {
        let outcome = self.roster.leave(id);

        match &outcome {
            LeaveOutcome::LeftAndPromoted(promoted) => {
                info!(
                    target: "roster.actor.manager",
                    user_id = %id,
                    promoted_user_id = %promoted.id,
                    "Member left, promoted from waitlist"
                );
            }
            LeaveOutcome::Left | LeaveOutcome::NotPresent => {
                debug!(
                    target: "roster.actor.manager",
                    user_id = %id,
                    ?outcome,
                    "Leave processed"
                );
            }
        }

        outcome
    }
}
