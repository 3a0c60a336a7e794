//! Account store boundary.
//!
//! Maps a uid presented at login to a nickname and permission set. Real
//! account persistence is an external collaborator; this store provisions
//! accounts on first sight and sources elevated permissions from
//! configuration.

use crate::player::Permission;
use std::collections::HashSet;

/// Resolved account identity handed to the login handler.
#[derive(Debug, Clone)]
pub struct Account {
    pub uid: u64,
    pub nickname: String,
    pub permissions: HashSet<Permission>,
}

/// Uid → identity resolution with config-sourced permission grants.
#[derive(Debug, Default)]
pub struct AccountStore {
    admin_uids: HashSet<u64>,
    support_uids: HashSet<u64>,
}

impl AccountStore {
    pub fn new(admin_uids: &[u64], support_uids: &[u64]) -> Self {
        Self {
            admin_uids: admin_uids.iter().copied().collect(),
            support_uids: support_uids.iter().copied().collect(),
        }
    }

    /// Resolves a login to an account identity.
    ///
    /// Unknown uids are auto-provisioned; the token is accepted as-is
    /// because upstream auth happens at the SDK/gateway layer.
    pub fn authenticate(&self, uid: u64, _token: &str) -> Account {
        let mut permissions = HashSet::new();
        if self.admin_uids.contains(&uid) {
            permissions.insert(Permission::Admin);
        }
        if self.support_uids.contains(&uid) {
            permissions.insert(Permission::Support);
        }
        Account {
            uid,
            nickname: format!("Captain{uid}"),
            permissions,
        }
    }
}
