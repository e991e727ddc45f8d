//! Caller-facing client facade.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::RpnResult;
use crate::gateway::{Gateway, HttpGateway};
use crate::reconcile::Reconciler;
use crate::repository::GroupRepository;
use crate::server::ServerClient;
use crate::types::{Group, GroupId, GroupSpec};

/// Client for the dedicated-server API.
///
/// Group reads go straight to the repository and are unsynchronized; group
/// writes (`apply`, `delete_group`) run through the reconciler, which
/// serializes them per client instance. Nothing orders writes across
/// instances or processes.
pub struct RpnClient {
    repository: GroupRepository,
    reconciler: Reconciler,
    servers: ServerClient,
}

impl RpnClient {
    /// Create a client from configuration.
    pub fn new(config: &ApiConfig) -> RpnResult<Self> {
        let gateway = Arc::new(HttpGateway::new(config)?);
        Ok(Self::with_gateway(gateway, config.poll_interval()))
    }

    /// Create a client on top of an existing gateway.
    ///
    /// This is the injection point for [`MockGateway`](crate::gateway::MockGateway)
    /// in tests.
    #[must_use]
    pub fn with_gateway(gateway: Arc<dyn Gateway>, poll_interval: Duration) -> Self {
        Self {
            repository: GroupRepository::new(Arc::clone(&gateway)),
            reconciler: Reconciler::new(Arc::clone(&gateway), poll_interval),
            servers: ServerClient::new(gateway),
        }
    }

    /// Fetch a group by id.
    pub async fn group(&self, id: GroupId) -> RpnResult<Group> {
        self.repository.get(id).await
    }

    /// Fetch a group by exact name; `Ok(None)` when no group matches.
    pub async fn group_by_name(&self, name: &str) -> RpnResult<Option<Group>> {
        self.repository.get_by_name(name).await
    }

    /// List all groups visible to the account.
    pub async fn groups(&self) -> RpnResult<Vec<Group>> {
        self.repository.list().await
    }

    /// Bring a group to the desired state and wait for it to settle.
    pub async fn apply(&self, spec: &GroupSpec, timeout: Duration) -> RpnResult<GroupId> {
        self.reconciler.apply(spec, timeout).await
    }

    /// Delete a group and wait for the removal to be observed.
    pub async fn delete_group(&self, id: GroupId, timeout: Duration) -> RpnResult<()> {
        self.reconciler.delete(id, timeout).await
    }

    /// Server-side single-call operations.
    #[must_use]
    pub fn servers(&self) -> &ServerClient {
        &self.servers
    }
}

impl std::fmt::Debug for RpnClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpnClient").finish_non_exhaustive()
    }
}
