//! Roster state machine: a capacity-bounded main list with a FIFO waitlist.
//!
//! Every member is in exactly one of three states:
//!
//! ```text
//! Absent --join (room)--> Confirmed
//! Absent --join (full)--> Waitlisted
//! Confirmed --leave--> Absent   (+ front of waitlist promoted to Confirmed)
//! Waitlisted --leave--> Absent  (never promotes)
//! ```
//!
//! `join` for a member already in either list is a no-op. Shrinking capacity
//! never evicts confirmed members; it only constrains future joins.
//!
//! `Roster` is plain data with no locking. Concurrent access goes through
//! [`crate::actors::RosterManagerHandle`], which serializes every operation.

use common::types::UserId;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt::Write as _;

/// A roster member. Name and handle are captured at join time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: UserId,
    pub display_name: String,
    /// Platform handle without `@`; empty when the user has none.
    pub handle: String,
}

impl Member {
    pub fn new(id: UserId, display_name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            handle: handle.into(),
        }
    }

    /// `Display Name (@handle)`, or just the name when there is no handle.
    pub fn label(&self) -> String {
        if self.handle.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} (@{})", self.display_name, self.handle)
        }
    }
}

/// Shared event configuration. Last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventConfig {
    pub capacity: u32,
    pub venue: String,
    /// Free text, never parsed.
    pub date: String,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            venue: "Not Set".to_string(),
            date: "Not Set".to_string(),
        }
    }
}

/// Result of [`Roster::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    Waitlisted,
    AlreadyPresent,
}

/// Result of [`Roster::leave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Left the main list; the longest-waiting member took the slot.
    LeftAndPromoted(Member),
    Left,
    NotPresent,
}

/// Point-in-time copy of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSnapshot {
    pub main_list: Vec<Member>,
    pub wait_list: Vec<Member>,
    pub event: EventConfig,
}

/// Main list, waitlist and event configuration.
#[derive(Debug, Default)]
pub struct Roster {
    main_list: Vec<Member>,
    wait_list: VecDeque<Member>,
    event: EventConfig,
}

impl Roster {
    #[must_use]
    pub fn new(event: EventConfig) -> Self {
        Self {
            main_list: Vec::new(),
            wait_list: VecDeque::new(),
            event,
        }
    }

    pub fn main_len(&self) -> usize {
        self.main_list.len()
    }

    pub fn wait_len(&self) -> usize {
        self.wait_list.len()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.main_list.iter().any(|m| m.id == id) || self.wait_list.iter().any(|m| m.id == id)
    }

    fn has_room(&self) -> bool {
        // u32 -> usize never truncates on supported targets.
        self.main_list.len() < self.event.capacity as usize
    }

    /// Add a member to the main list if there is room, otherwise to the back
    /// of the waitlist.
    pub fn join(&mut self, member: Member) -> JoinOutcome {
        if self.contains(member.id) {
            return JoinOutcome::AlreadyPresent;
        }

        if self.has_room() {
            self.main_list.push(member);
            JoinOutcome::Joined
        } else {
            self.wait_list.push_back(member);
            JoinOutcome::Waitlisted
        }
    }

    /// Remove a member from whichever list holds them.
    ///
    /// A main-list departure promotes the front of the waitlist; a waitlist
    /// departure promotes nobody.
    pub fn leave(&mut self, id: UserId) -> LeaveOutcome {
        if let Some(pos) = self.main_list.iter().position(|m| m.id == id) {
            self.main_list.remove(pos);
            return match self.wait_list.pop_front() {
                Some(promoted) => {
                    self.main_list.push(promoted.clone());
                    LeaveOutcome::LeftAndPromoted(promoted)
                }
                None => LeaveOutcome::Left,
            };
        }

        if let Some(pos) = self.wait_list.iter().position(|m| m.id == id) {
            self.wait_list.remove(pos);
            return LeaveOutcome::Left;
        }

        LeaveOutcome::NotPresent
    }

    /// Overwrite the event configuration. Existing main-list members stay even
    /// if they now exceed `capacity`.
    pub fn set_event_details(&mut self, event: EventConfig) {
        self.event = event;
    }

    /// Empty both lists. Event configuration is kept.
    pub fn clear(&mut self) {
        self.main_list.clear();
        self.wait_list.clear();
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            main_list: self.main_list.clone(),
            wait_list: self.wait_list.iter().cloned().collect(),
            event: self.event.clone(),
        }
    }

    /// Render the roster as plain text with 1-based ordinals.
    pub fn format(&self) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Event: {} on {}", self.event.venue, self.event.date);
        let _ = writeln!(
            out,
            "Main list ({}/{}):",
            self.main_list.len(),
            self.event.capacity
        );

        if self.main_list.is_empty() {
            out.push_str("No members yet.\n");
        }
        for (i, member) in self.main_list.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, member.label());
        }

        if !self.wait_list.is_empty() {
            let _ = writeln!(out, "\nWaitlist ({}):", self.wait_list.len());
            for (i, member) in self.wait_list.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, member.label());
            }
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn member(id: i64) -> Member {
        Member::new(UserId(id), format!("Player {id}"), format!("player{id}"))
    }

    fn roster_with_capacity(capacity: u32) -> Roster {
        Roster::new(EventConfig {
            capacity,
            ..EventConfig::default()
        })
    }

    fn ids(members: &[Member]) -> Vec<i64> {
        members.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn test_join_fills_main_then_waitlist() {
        let mut roster = roster_with_capacity(2);

        assert_eq!(roster.join(member(1)), JoinOutcome::Joined);
        assert_eq!(roster.join(member(2)), JoinOutcome::Joined);
        assert_eq!(roster.join(member(3)), JoinOutcome::Waitlisted);
        assert_eq!(roster.join(member(4)), JoinOutcome::Waitlisted);

        let snap = roster.snapshot();
        assert_eq!(ids(&snap.main_list), vec![1, 2]);
        assert_eq!(ids(&snap.wait_list), vec![3, 4]);
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));
        let before = roster.snapshot();

        assert_eq!(roster.join(member(1)), JoinOutcome::AlreadyPresent);
        assert_eq!(roster.join(member(2)), JoinOutcome::AlreadyPresent);
        assert_eq!(roster.snapshot(), before);
    }

    #[test]
    fn test_join_keeps_first_captured_name() {
        let mut roster = roster_with_capacity(5);
        roster.join(member(1));
        roster.join(Member::new(UserId(1), "Renamed", "renamed"));

        let snap = roster.snapshot();
        assert_eq!(snap.main_list[0].display_name, "Player 1");
        assert_eq!(snap.main_list[0].handle, "player1");
    }

    #[test]
    fn test_fifo_promotion_on_main_departure() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));
        roster.join(member(3));

        assert_eq!(roster.leave(UserId(1)), LeaveOutcome::LeftAndPromoted(member(2)));

        let snap = roster.snapshot();
        assert_eq!(ids(&snap.main_list), vec![2]);
        assert_eq!(ids(&snap.wait_list), vec![3]);
    }

    #[test]
    fn test_promoted_member_goes_to_end_of_main() {
        let mut roster = roster_with_capacity(3);
        for id in 1..=5 {
            roster.join(member(id));
        }

        roster.leave(UserId(1));

        assert_eq!(ids(&roster.snapshot().main_list), vec![2, 3, 4]);
    }

    #[test]
    fn test_waitlist_departure_does_not_cascade() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));
        roster.join(member(3));

        assert_eq!(roster.leave(UserId(2)), LeaveOutcome::Left);

        let snap = roster.snapshot();
        assert_eq!(ids(&snap.main_list), vec![1]);
        assert_eq!(ids(&snap.wait_list), vec![3]);
    }

    #[test]
    fn test_leave_without_waitlist() {
        let mut roster = roster_with_capacity(3);
        roster.join(member(1));
        roster.join(member(2));

        assert_eq!(roster.leave(UserId(1)), LeaveOutcome::Left);
        assert_eq!(ids(&roster.snapshot().main_list), vec![2]);
    }

    #[test]
    fn test_leave_absent_is_noop() {
        let mut roster = roster_with_capacity(1);
        assert_eq!(roster.leave(UserId(42)), LeaveOutcome::NotPresent);

        roster.join(member(1));
        let before = roster.snapshot();
        assert_eq!(roster.leave(UserId(42)), LeaveOutcome::NotPresent);
        assert_eq!(roster.snapshot(), before);
    }

    #[test]
    fn test_rejoin_after_leave_goes_to_back() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));
        roster.leave(UserId(2));

        roster.join(member(3));
        assert_eq!(roster.join(member(2)), JoinOutcome::Waitlisted);
        assert_eq!(ids(&roster.snapshot().wait_list), vec![3, 2]);
    }

    #[test]
    fn test_capacity_shrink_grandfathers_main_list() {
        let mut roster = roster_with_capacity(3);
        for id in 1..=3 {
            roster.join(member(id));
        }

        roster.set_event_details(EventConfig {
            capacity: 1,
            venue: "Pitch 2".to_string(),
            date: "Saturday".to_string(),
        });

        assert_eq!(roster.join(member(4)), JoinOutcome::Waitlisted);
        let snap = roster.snapshot();
        assert_eq!(ids(&snap.main_list), vec![1, 2, 3]);
        assert_eq!(ids(&snap.wait_list), vec![4]);
        assert_eq!(snap.event.venue, "Pitch 2");
    }

    #[test]
    fn test_capacity_growth_applies_to_future_joins_only() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));

        roster.set_event_details(EventConfig {
            capacity: 3,
            ..EventConfig::default()
        });

        // Existing waitlist is not auto-promoted by a capacity change.
        assert_eq!(ids(&roster.snapshot().wait_list), vec![2]);
        assert_eq!(roster.join(member(3)), JoinOutcome::Joined);
    }

    #[test]
    fn test_zero_capacity_waitlists_everyone() {
        let mut roster = roster_with_capacity(0);
        assert_eq!(roster.join(member(1)), JoinOutcome::Waitlisted);
        assert_eq!(roster.join(member(2)), JoinOutcome::Waitlisted);
        assert_eq!(roster.main_len(), 0);
        assert_eq!(roster.leave(UserId(1)), LeaveOutcome::Left);
        assert_eq!(roster.main_len(), 0);
    }

    #[test]
    fn test_clear_keeps_event_config() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));

        roster.clear();

        assert_eq!(roster.main_len(), 0);
        assert_eq!(roster.wait_len(), 0);
        assert_eq!(roster.snapshot().event.capacity, 1);
        assert_eq!(roster.join(member(2)), JoinOutcome::Joined);
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let mut roster = roster_with_capacity(3);
        // Deterministic pseudo-random walk over join/leave for ids 0..8.
        let mut seed: u64 = 0x5eed;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let id = i64::try_from((seed >> 33) % 8).unwrap();
            if (seed >> 20) % 3 == 0 {
                roster.leave(UserId(id));
            } else {
                roster.join(member(id));
            }

            let snap = roster.snapshot();
            assert!(snap.main_list.len() <= 3);

            let mut all = ids(&snap.main_list);
            all.extend(ids(&snap.wait_list));
            let total = all.len();
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), total, "an id appeared twice");

            // The waitlist is only non-empty while the main list is full.
            if !snap.wait_list.is_empty() {
                assert_eq!(snap.main_list.len(), 3);
            }
        }
    }

    #[test]
    fn test_format_empty_roster() {
        let roster = Roster::default();
        assert_eq!(
            roster.format(),
            "Event: Not Set on Not Set\nMain list (0/20):\nNo members yet."
        );
    }

    #[test]
    fn test_format_with_waitlist() {
        let mut roster = Roster::new(EventConfig {
            capacity: 1,
            venue: "Central Park".to_string(),
            date: "2026-10-24 10:00".to_string(),
        });
        roster.join(member(1));
        roster.join(member(2));
        roster.join(Member::new(UserId(3), "No Handle", ""));

        assert_eq!(
            roster.format(),
            "Event: Central Park on 2026-10-24 10:00\n\
             Main list (1/1):\n\
             1. Player 1 (@player1)\n\
             \n\
             Waitlist (2):\n\
             1. Player 2 (@player2)\n\
             2. No Handle"
        );
    }

    #[test]
    fn test_format_does_not_mutate() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(member(2));
        let before = roster.snapshot();

        let first = roster.format();
        let second = roster.format();

        assert_eq!(first, second);
        assert_eq!(roster.snapshot(), before);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut roster = roster_with_capacity(1);
        roster.join(member(1));
        roster.join(Member::new(UserId(2), "No Handle", ""));

        let value = serde_json::to_value(roster.snapshot()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "main_list": [
                    {"id": 1, "display_name": "Player 1", "handle": "player1"}
                ],
                "wait_list": [
                    {"id": 2, "display_name": "No Handle", "handle": ""}
                ],
                "event": {"capacity": 1, "venue": "Not Set", "date": "Not Set"}
            })
        );
    }
}
