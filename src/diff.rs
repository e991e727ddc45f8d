//! Membership diffing.

use std::collections::HashSet;

use crate::types::{Member, MemberSpec, ServerId};

/// Minimal membership mutation set between a remote snapshot and a desired
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberDiff {
    /// Servers present in the desired state but not in the snapshot.
    pub to_add: Vec<ServerId>,
    /// Servers present in the snapshot but not in the desired state.
    pub to_delete: Vec<ServerId>,
}

impl MemberDiff {
    /// Whether the diff requires no mutation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the add/remove sets between `current` and `desired`, keyed by
/// referenced server id.
///
/// Pure. Output order is deterministic: `to_add` follows the desired order,
/// `to_delete` the snapshot order. Empty vectors mean the caller must skip
/// the corresponding network call entirely.
#[must_use]
pub fn diff_members(current: &[Member], desired: &[MemberSpec]) -> MemberDiff {
    let current_ids: HashSet<ServerId> = current.iter().map(|m| m.linked.id).collect();
    let desired_ids: HashSet<ServerId> = desired.iter().map(|m| m.server_id).collect();

    MemberDiff {
        to_add: desired
            .iter()
            .map(|m| m.server_id)
            .filter(|id| !current_ids.contains(id))
            .collect(),
        to_delete: current
            .iter()
            .map(|m| m.linked.id)
            .filter(|id| !desired_ids.contains(id))
            .collect(),
    }
}
