//! Chat command layer.
//!
//! Turns a line of user text into at most one roster operation and a reply.
//! Privileged commands are checked against the admin registry before the
//! operation runs. The multi-step `/setevent` flow keeps per-user state here,
//! never in the roster manager.

use crate::actors::RosterManagerHandle;
use crate::auth::{GrantOutcome, RevokeOutcome};
use crate::errors::RosterError;
use crate::roster::{EventConfig, JoinOutcome, LeaveOutcome};
use common::types::{Handle, UserId};
use std::collections::HashMap;
use std::fmt::Write as _;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Expected argument format for `/setevent`.
pub const EVENT_DETAILS_FORMAT: &str = "<capacity>; <venue>; <date>";

pub const HELP_TEXT: &str = "\
Commands:
/list - show the roster
/join - join the main list (or the waitlist when full)
/leave - leave the roster
/setevent <capacity>; <venue>; <date> - update event details (admin)
/clear - empty the roster (admin)
/admins - list admins (admin)
/grant @handle - make a user admin (super-admin)
/revoke @handle - remove a user's admin rights (super-admin)
/addsuper @handle - make a user super-admin (super-admin)
/removesuper @handle - remove a super-admin (super-admin)
/cancel - abort a pending /setevent
/help - show this message";

const USAGE_HINT: &str = "Unknown command. Send /help to see what I can do.";

/// The user who sent a message, as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<Handle>,
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Join,
    Leave,
    /// `/setevent` with its raw argument text, if any.
    SetEvent(Option<String>),
    Cancel,
    Clear,
    Admins,
    Grant(String),
    Revoke(String),
    AddSuper(String),
    RemoveSuper(String),
    Help,
    Unknown(String),
}

impl Command {
    /// Parse a message. Returns `None` for plain text (no leading `/`).
    ///
    /// The command name is case-insensitive and a `@botname` suffix is
    /// ignored, so `/Join@RosterBot` parses as [`Command::Join`].
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;

        let (word, args) = match rest.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (rest, ""),
        };
        let name = word
            .split_once('@')
            .map_or(word, |(name, _bot)| name)
            .to_ascii_lowercase();
        let args = args.to_string();

        let command = match name.as_str() {
            "start" | "list" => Command::List,
            "join" => Command::Join,
            "leave" => Command::Leave,
            "setevent" => Command::SetEvent((!args.is_empty()).then_some(args)),
            "cancel" => Command::Cancel,
            "clear" => Command::Clear,
            "admins" => Command::Admins,
            "grant" => Command::Grant(args),
            "revoke" => Command::Revoke(args),
            "addsuper" => Command::AddSuper(args),
            "removesuper" => Command::RemoveSuper(args),
            "help" => Command::Help,
            _ => Command::Unknown(name),
        };

        Some(command)
    }

    /// Short name for logs.
    fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Join => "join",
            Command::Leave => "leave",
            Command::SetEvent(_) => "setevent",
            Command::Cancel => "cancel",
            Command::Clear => "clear",
            Command::Admins => "admins",
            Command::Grant(_) => "grant",
            Command::Revoke(_) => "revoke",
            Command::AddSuper(_) => "addsuper",
            Command::RemoveSuper(_) => "removesuper",
            Command::Help => "help",
            Command::Unknown(_) => "unknown",
        }
    }
}

/// Why `/setevent` arguments were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventDetailsError {
    #[error("expected three fields separated by ';'")]
    WrongFieldCount,

    #[error("capacity must be a whole number of 0 or more, got {0:?}")]
    InvalidCapacity(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Parse `<capacity>; <venue>; <date>`.
pub fn parse_event_details(raw: &str) -> Result<EventConfig, EventDetailsError> {
    let fields: Vec<&str> = raw.split(';').map(str::trim).collect();
    let [capacity, venue, date] = fields.as_slice() else {
        return Err(EventDetailsError::WrongFieldCount);
    };

    let capacity = capacity
        .parse::<u32>()
        .map_err(|_| EventDetailsError::InvalidCapacity((*capacity).to_string()))?;
    if venue.is_empty() {
        return Err(EventDetailsError::EmptyField("venue"));
    }
    if date.is_empty() {
        return Err(EventDetailsError::EmptyField("date"));
    }

    Ok(EventConfig {
        capacity,
        venue: (*venue).to_string(),
        date: (*date).to_string(),
    })
}

/// Per-user conversation state between messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// `/setevent` was sent without arguments; the next plain text is the
    /// event details.
    AwaitingEventDetails,
}

enum Gate {
    Admin,
    SuperAdmin,
}

/// Routes chat text to the roster manager and renders replies.
pub struct CommandDispatcher {
    roster: RosterManagerHandle,
    pending: Mutex<HashMap<UserId, PendingInput>>,
}

impl CommandDispatcher {
    #[must_use]
    pub fn new(roster: RosterManagerHandle) -> Self {
        Self {
            roster,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Pending state for a user, if any.
    pub async fn pending_for(&self, id: UserId) -> Option<PendingInput> {
        self.pending.lock().await.get(&id).copied()
    }

    /// Handle one message and return the reply text.
    ///
    /// Sending any command abandons a pending `/setevent`.
    pub async fn handle(&self, caller: &Caller, text: &str) -> String {
        let result = match Command::parse(text) {
            Some(command) => {
                debug!(
                    target: "roster.commands",
                    user_id = %caller.id,
                    command = command.name(),
                    "Command received"
                );
                let abandoned = self.pending.lock().await.remove(&caller.id);
                if command == Command::Cancel {
                    Ok(match abandoned {
                        Some(_) => "Cancelled.".to_string(),
                        None => "Nothing to cancel.".to_string(),
                    })
                } else {
                    self.dispatch(caller, command).await
                }
            }
            None => self.handle_plain_text(caller, text).await,
        };

        result.unwrap_or_else(|e| {
            warn!(
                target: "roster.commands",
                user_id = %caller.id,
                error = %e,
                "Command failed"
            );
            e.client_message()
        })
    }

    async fn handle_plain_text(&self, caller: &Caller, text: &str) -> Result<String, RosterError> {
        let pending = self.pending_for(caller.id).await;
        match pending {
            Some(PendingInput::AwaitingEventDetails) => {
                // Privilege may have been revoked since /setevent was sent.
                if let Some(refusal) = self.check(caller, &Gate::Admin).await? {
                    self.pending.lock().await.remove(&caller.id);
                    return Ok(refusal);
                }
                match self.apply_event_details(text).await? {
                    Ok(reply) => {
                        self.pending.lock().await.remove(&caller.id);
                        Ok(reply)
                    }
                    // Keep waiting so the user can retry.
                    Err(retry) => Ok(retry),
                }
            }
            None => Ok(USAGE_HINT.to_string()),
        }
    }

    async fn dispatch(&self, caller: &Caller, command: Command) -> Result<String, RosterError> {
        match command {
            Command::List => self.roster.format_roster().await,
            Command::Join => self.join(caller).await,
            Command::Leave => self.leave(caller).await,
            Command::SetEvent(args) => self.set_event(caller, args).await,
            Command::Cancel => Ok("Nothing to cancel.".to_string()),
            Command::Clear => {
                if let Some(refusal) = self.check(caller, &Gate::Admin).await? {
                    return Ok(refusal);
                }
                self.roster.clear_roster().await?;
                info!(target: "roster.commands", user_id = %caller.id, "Roster cleared by admin");
                Ok("Roster cleared.".to_string())
            }
            Command::Admins => {
                if let Some(refusal) = self.check(caller, &Gate::Admin).await? {
                    return Ok(refusal);
                }
                let admins = self.roster.list_admins().await?;
                Ok(render_admins(&admins))
            }
            Command::Grant(arg) => match self.handle_argument(caller, "/grant", &arg).await? {
                Ok(handle) => {
                    let outcome = self.roster.grant_admin(handle.as_str()).await?;
                    Ok(describe_grant(&handle, outcome, "an admin"))
                }
                Err(reply) => Ok(reply),
            },
            Command::Revoke(arg) => match self.handle_argument(caller, "/revoke", &arg).await? {
                Ok(handle) => {
                    let outcome = self.roster.revoke_admin(handle.as_str()).await?;
                    Ok(describe_revoke(&handle, outcome, "an admin"))
                }
                Err(reply) => Ok(reply),
            },
            Command::AddSuper(arg) => {
                match self.handle_argument(caller, "/addsuper", &arg).await? {
                    Ok(handle) => {
                        let outcome = self.roster.grant_super_admin(handle.as_str()).await?;
                        Ok(describe_grant(&handle, outcome, "a super-admin"))
                    }
                    Err(reply) => Ok(reply),
                }
            }
            Command::RemoveSuper(arg) => {
                match self.handle_argument(caller, "/removesuper", &arg).await? {
                    Ok(handle) => {
                        let outcome = self.roster.revoke_super_admin(handle.as_str()).await?;
                        Ok(describe_revoke(&handle, outcome, "a super-admin"))
                    }
                    Err(reply) => Ok(reply),
                }
            }
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Unknown(_) => Ok(USAGE_HINT.to_string()),
        }
    }

    async fn join(&self, caller: &Caller) -> Result<String, RosterError> {
        let handle = caller.handle.as_ref().map(Handle::as_str).unwrap_or_default();
        let outcome = self
            .roster
            .join(caller.id, caller.display_name.clone(), handle)
            .await?;

        Ok(match outcome {
            JoinOutcome::Joined => "You've been added to the main list!".to_string(),
            JoinOutcome::Waitlisted => {
                "The main list is full. You've been added to the waitlist.".to_string()
            }
            JoinOutcome::AlreadyPresent => {
                "You're already on the main list or the waitlist.".to_string()
            }
        })
    }

    async fn leave(&self, caller: &Caller) -> Result<String, RosterError> {
        Ok(match self.roster.leave(caller.id).await? {
            LeaveOutcome::LeftAndPromoted(promoted) => format!(
                "You left. {} was promoted from the waitlist.",
                promoted.label()
            ),
            LeaveOutcome::Left => "You've left the roster.".to_string(),
            LeaveOutcome::NotPresent => "You're not on any list.".to_string(),
        })
    }

    async fn set_event(&self, caller: &Caller, args: Option<String>) -> Result<String, RosterError> {
        if let Some(refusal) = self.check(caller, &Gate::Admin).await? {
            return Ok(refusal);
        }

        match args {
            Some(args) => match self.apply_event_details(&args).await? {
                Ok(reply) | Err(reply) => Ok(reply),
            },
            None => {
                self.pending
                    .lock()
                    .await
                    .insert(caller.id, PendingInput::AwaitingEventDetails);
                Ok(format!(
                    "Send the event details as: {EVENT_DETAILS_FORMAT}\nOr /cancel to abort."
                ))
            }
        }
    }

    /// Parse and apply event details. The inner `Err` is a user-facing
    /// format error.
    async fn apply_event_details(&self, raw: &str) -> Result<Result<String, String>, RosterError> {
        let event = match parse_event_details(raw) {
            Ok(event) => event,
            Err(e) => {
                return Ok(Err(format!(
                    "Couldn't read that ({e}). Expected: {EVENT_DETAILS_FORMAT}"
                )))
            }
        };

        let reply = format!(
            "Event updated: {} players at {} on {}.",
            event.capacity, event.venue, event.date
        );
        self.roster
            .set_event_details(event.capacity, event.venue, event.date)
            .await?;
        Ok(Ok(reply))
    }

    /// Gate a super-admin command and parse its `@handle` argument. The
    /// inner `Err` is the reply to send instead.
    async fn handle_argument(
        &self,
        caller: &Caller,
        usage: &str,
        arg: &str,
    ) -> Result<Result<Handle, String>, RosterError> {
        if let Some(refusal) = self.check(caller, &Gate::SuperAdmin).await? {
            return Ok(Err(refusal));
        }

        let Some(raw) = arg.split_whitespace().next() else {
            return Ok(Err(format!("Usage: {usage} @handle")));
        };

        Ok(Handle::parse(raw).map_err(|e| {
            debug!(target: "roster.commands", error = %e, "Rejected handle argument");
            format!("That isn't a valid handle. Usage: {usage} @handle")
        }))
    }

    /// Returns a refusal message when the caller lacks the privilege.
    async fn check(&self, caller: &Caller, gate: &Gate) -> Result<Option<String>, RosterError> {
        let (allowed, refusal) = match gate {
            Gate::Admin => (
                self.roster
                    .is_admin(Some(caller.id), caller.handle.as_ref())
                    .await?,
                "Only admins can do that.",
            ),
            Gate::SuperAdmin => (
                self.roster
                    .is_super_admin(Some(caller.id), caller.handle.as_ref())
                    .await?,
                "Only super-admins can do that.",
            ),
        };

        if allowed {
            Ok(None)
        } else {
            info!(
                target: "roster.commands",
                user_id = %caller.id,
                "Privileged command refused"
            );
            Ok(Some(refusal.to_string()))
        }
    }
}

fn describe_grant(handle: &Handle, outcome: GrantOutcome, role: &str) -> String {
    match outcome {
        GrantOutcome::Granted => format!("{handle} is now {role}."),
        GrantOutcome::AlreadyAdmin => format!("{handle} is already {role}."),
    }
}

fn describe_revoke(handle: &Handle, outcome: RevokeOutcome, role: &str) -> String {
    match outcome {
        RevokeOutcome::Revoked => format!("{handle} is no longer {role}."),
        RevokeOutcome::NotAdmin => format!("{handle} is not {role}."),
        RevokeOutcome::Protected => {
            format!("{handle} is a permanent super-admin and cannot be removed.")
        }
    }
}

fn render_admins(admins: &[Handle]) -> String {
    if admins.is_empty() {
        return "No admins granted yet.".to_string();
    }
    let mut out = String::from("Admins:");
    for handle in admins {
        let _ = write!(out, "\n{handle}");
    }
    out
}
