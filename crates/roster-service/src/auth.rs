//! Two-tier authorization: super-admins and admins.
//!
//! Super-admins come from two places: an operator-configured seed set (by
//! handle or by user id) that can never be removed, and handles granted at
//! runtime. Every super-admin is implicitly an admin. Only plain admin
//! handles are mirrored to the external admin store; super-admin state lives
//! in process memory.

use common::types::{Handle, UserId};
use std::collections::HashSet;

/// Result of granting a privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    AlreadyAdmin,
}

/// Result of revoking a privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NotAdmin,
    /// Handle belongs to the seed super-admin set and cannot be revoked.
    Protected,
}

/// Operator-configured super-admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuperAdminSeed {
    pub handles: HashSet<Handle>,
    pub ids: HashSet<UserId>,
}

/// Admin and super-admin membership.
#[derive(Debug, Default)]
pub struct AdminRegistry {
    seed: SuperAdminSeed,
    super_admins: HashSet<Handle>,
    admins: HashSet<Handle>,
}

impl AdminRegistry {
    /// Create a registry from the seed set and the admins loaded from the store.
    pub fn new(seed: SuperAdminSeed, admins: impl IntoIterator<Item = Handle>) -> Self {
        Self {
            seed,
            super_admins: HashSet::new(),
            admins: admins.into_iter().collect(),
        }
    }

    fn is_seed_handle(&self, handle: &Handle) -> bool {
        self.seed.handles.contains(handle)
    }

    pub fn is_super_admin(&self, id: Option<UserId>, handle: Option<&Handle>) -> bool {
        id.is_some_and(|id| self.seed.ids.contains(&id))
            || handle.is_some_and(|h| self.is_seed_handle(h) || self.super_admins.contains(h))
    }

    pub fn is_admin(&self, id: Option<UserId>, handle: Option<&Handle>) -> bool {
        handle.is_some_and(|h| self.admins.contains(h)) || self.is_super_admin(id, handle)
    }

    pub fn grant_admin(&mut self, handle: Handle) -> GrantOutcome {
        if self.admins.insert(handle) {
            GrantOutcome::Granted
        } else {
            GrantOutcome::AlreadyAdmin
        }
    }

    pub fn revoke_admin(&mut self, handle: &Handle) -> RevokeOutcome {
        if self.is_seed_handle(handle) {
            return RevokeOutcome::Protected;
        }
        if self.admins.remove(handle) {
            RevokeOutcome::Revoked
        } else {
            RevokeOutcome::NotAdmin
        }
    }

    pub fn grant_super_admin(&mut self, handle: Handle) -> GrantOutcome {
        if self.is_seed_handle(&handle) || !self.super_admins.insert(handle) {
            GrantOutcome::AlreadyAdmin
        } else {
            GrantOutcome::Granted
        }
    }

    pub fn revoke_super_admin(&mut self, handle: &Handle) -> RevokeOutcome {
        if self.is_seed_handle(handle) {
            return RevokeOutcome::Protected;
        }
        if self.super_admins.remove(handle) {
            RevokeOutcome::Revoked
        } else {
            RevokeOutcome::NotAdmin
        }
    }

    /// Plain admin handles, sorted.
    pub fn admins(&self) -> Vec<Handle> {
        let mut admins: Vec<Handle> = self.admins.iter().cloned().collect();
        admins.sort();
        admins
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn handle(raw: &str) -> Handle {
        Handle::parse(raw).unwrap()
    }

    fn registry() -> AdminRegistry {
        AdminRegistry::new(
            SuperAdminSeed {
                handles: HashSet::from([handle("vvmode"), handle("xellision")]),
                ids: HashSet::from([UserId(1001)]),
            },
            [handle("coach")],
        )
    }

    #[test]
    fn test_seed_handles_are_super_admins_and_admins() {
        let reg = registry();
        let h = handle("@VVMode");

        assert!(reg.is_super_admin(None, Some(&h)));
        assert!(reg.is_admin(None, Some(&h)));
    }

    #[test]
    fn test_seed_id_is_super_admin_without_handle() {
        let reg = registry();

        assert!(reg.is_super_admin(Some(UserId(1001)), None));
        assert!(reg.is_admin(Some(UserId(1001)), None));
        assert!(!reg.is_admin(Some(UserId(1002)), None));
    }

    #[test]
    fn test_loaded_admin_is_not_super_admin() {
        let reg = registry();
        let h = handle("coach");

        assert!(reg.is_admin(Some(UserId(7)), Some(&h)));
        assert!(!reg.is_super_admin(Some(UserId(7)), Some(&h)));
    }

    #[test]
    fn test_unknown_user_has_no_privileges() {
        let reg = registry();
        assert!(!reg.is_admin(Some(UserId(9)), Some(&handle("stranger"))));
        assert!(!reg.is_admin(None, None));
    }

    #[test]
    fn test_grant_and_revoke_admin() {
        let mut reg = registry();
        let h = handle("newbie");

        assert_eq!(reg.grant_admin(h.clone()), GrantOutcome::Granted);
        assert_eq!(reg.grant_admin(h.clone()), GrantOutcome::AlreadyAdmin);
        assert!(reg.is_admin(None, Some(&h)));

        assert_eq!(reg.revoke_admin(&h), RevokeOutcome::Revoked);
        assert_eq!(reg.revoke_admin(&h), RevokeOutcome::NotAdmin);
        assert!(!reg.is_admin(None, Some(&h)));
    }

    #[test]
    fn test_seed_super_admin_cannot_be_revoked() {
        let mut reg = registry();
        let h = handle("xellision");
        // Even if the seed handle was also granted as a plain admin.
        reg.grant_admin(h.clone());

        assert_eq!(reg.revoke_admin(&h), RevokeOutcome::Protected);
        assert_eq!(reg.revoke_super_admin(&h), RevokeOutcome::Protected);
        assert!(reg.is_super_admin(None, Some(&h)));
        assert!(reg.admins().contains(&h));
    }

    #[test]
    fn test_dynamic_super_admin_lifecycle() {
        let mut reg = registry();
        let h = handle("captain");

        assert_eq!(reg.grant_super_admin(h.clone()), GrantOutcome::Granted);
        assert!(reg.is_super_admin(None, Some(&h)));
        assert!(reg.is_admin(None, Some(&h)));
        // Super-admin grants are not plain admin entries.
        assert!(!reg.admins().contains(&h));

        assert_eq!(reg.revoke_super_admin(&h), RevokeOutcome::Revoked);
        assert!(!reg.is_admin(None, Some(&h)));
    }

    #[test]
    fn test_grant_super_admin_on_seed_is_noop() {
        let mut reg = registry();
        assert_eq!(
            reg.grant_super_admin(handle("vvmode")),
            GrantOutcome::AlreadyAdmin
        );
    }

    #[test]
    fn test_admins_sorted() {
        let mut reg = AdminRegistry::default();
        reg.grant_admin(handle("zed"));
        reg.grant_admin(handle("amy"));

        assert_eq!(reg.admins(), vec![handle("amy"), handle("zed")]);
    }
}
