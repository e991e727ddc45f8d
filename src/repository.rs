//! Read access to RPN groups.

use std::sync::Arc;

use crate::error::RpnResult;
use crate::gateway::Gateway;
use crate::types::{Group, GroupId};

/// Root path of the RPN group resource.
pub(crate) const RPN_ENDPOINT: &str = "/rpn/v2";

/// Path of a single group.
pub(crate) fn group_path(id: GroupId) -> String {
    format!("{RPN_ENDPOINT}/{id}")
}

/// Read-only group lookups.
///
/// These never take the client's write lock and may be issued concurrently
/// with an in-flight reconciliation, so they can observe transitional
/// (non-ACTIVE) snapshots.
#[derive(Clone)]
pub struct GroupRepository {
    gateway: Arc<dyn Gateway>,
}

impl GroupRepository {
    /// Create a repository on top of a gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetch a group by id.
    pub async fn get(&self, id: GroupId) -> RpnResult<Group> {
        let body = self.gateway.get(&group_path(id)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a group by exact name.
    ///
    /// Implemented by listing all groups; a missing name is `Ok(None)`,
    /// distinct from transport or decoding failures.
    pub async fn get_by_name(&self, name: &str) -> RpnResult<Option<Group>> {
        let groups = self.list().await?;
        Ok(groups.into_iter().find(|g| g.name == name))
    }

    /// List all groups visible to the account.
    pub async fn list(&self) -> RpnResult<Vec<Group>> {
        let body = self.gateway.get(RPN_ENDPOINT).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for GroupRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRepository").finish_non_exhaustive()
    }
}
