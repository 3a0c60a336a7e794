//! Player state attached to an authenticated session.

use std::collections::{HashMap, HashSet};
use valkyr_proto::packets::GetMainDataRsp;

/// Operator permission levels checked by the command framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Admin,
    Support,
}

/// Per-player game state.
///
/// A `Player` is created by the login handler and lives inside its session
/// for the lifetime of the connection. Inventory persistence beyond the
/// session is out of scope for this server core.
#[derive(Debug, Clone)]
pub struct Player {
    pub uid: u64,
    pub nickname: String,
    pub level: u32,
    pub head_icon: u32,
    pub signature: String,
    pub assistant_avatar_id: u32,
    pub permissions: HashSet<Permission>,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(uid: u64, nickname: String, permissions: HashSet<Permission>) -> Self {
        Self {
            uid,
            nickname,
            level: 1,
            head_icon: 0,
            signature: String::new(),
            assistant_avatar_id: 0,
            permissions,
            inventory: Inventory::default(),
        }
    }

    /// True when the player holds every permission in `required`.
    pub fn has_permissions(&self, required: &[Permission]) -> bool {
        required.iter().all(|p| self.permissions.contains(p))
    }

    /// Snapshot of the profile fields the client renders on the main view.
    pub fn main_data(&self) -> GetMainDataRsp {
        GetMainDataRsp {
            uid: self.uid,
            nickname: self.nickname.clone(),
            level: self.level,
            head_icon: self.head_icon,
            signature: self.signature.clone(),
            assistant_avatar_id: self.assistant_avatar_id,
        }
    }
}

/// In-memory item holdings, keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    materials: HashMap<u32, u64>,
    fragments: HashMap<u32, u64>,
}

impl Inventory {
    /// Adds `quantity` of a material, returning the new total.
    pub fn add_material(&mut self, item_id: u32, quantity: u64) -> u64 {
        let count = self.materials.entry(item_id).or_insert(0);
        *count = count.saturating_add(quantity);
        *count
    }

    /// Adds `quantity` of an avatar fragment, returning the new total.
    pub fn add_fragment(&mut self, fragment_id: u32, quantity: u64) -> u64 {
        let count = self.fragments.entry(fragment_id).or_insert(0);
        *count = count.saturating_add(quantity);
        *count
    }

    pub fn material_count(&self, item_id: u32) -> u64 {
        self.materials.get(&item_id).copied().unwrap_or(0)
    }

    pub fn fragment_count(&self, fragment_id: u32) -> u64 {
        self.fragments.get(&fragment_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_check_requires_full_set() {
        let mut player = Player::new(1, "t".into(), HashSet::from([Permission::Support]));
        assert!(player.has_permissions(&[]));
        assert!(player.has_permissions(&[Permission::Support]));
        assert!(!player.has_permissions(&[Permission::Admin]));
        player.permissions.insert(Permission::Admin);
        assert!(player.has_permissions(&[Permission::Admin, Permission::Support]));
    }

    #[test]
    fn inventory_totals_saturate() {
        let mut inv = Inventory::default();
        assert_eq!(inv.add_material(100, u64::MAX - 1), u64::MAX - 1);
        assert_eq!(inv.add_material(100, 5), u64::MAX);
        assert_eq!(inv.material_count(100), u64::MAX);
        assert_eq!(inv.material_count(101), 0);
    }
}
