//! Reconciliation of desired group state against the remote control plane.
//!
//! The remote side applies every mutation asynchronously and only exposes
//! polling for status, so a reconciliation sequence is: compute the minimal
//! mutation set against a fresh snapshot, apply it in a safe order, then
//! poll until the change has actually taken effect. A per-client mutex makes
//! whole sequences atomic with respect to each other; interleaved sequences
//! against the same account cannot be reasoned about.

mod poll;

pub use poll::StatusPoller;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::diff::diff_members;
use crate::error::{RpnError, RpnResult};
use crate::gateway::{decode_ack, Gateway};
use crate::repository::{group_path, GroupRepository, RPN_ENDPOINT};
use crate::types::{Group, GroupId, GroupSpec, MemberSpec, RpnType, ServerId};

/// Applies desired group state to the remote control plane.
pub struct Reconciler {
    gateway: Arc<dyn Gateway>,
    repository: GroupRepository,
    poller: StatusPoller,
    write_lock: Mutex<()>,
}

impl Reconciler {
    /// Create a reconciler on top of a gateway.
    ///
    /// `poll_interval` is the tick between settlement polls; the production
    /// default is one second.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, poll_interval: Duration) -> Self {
        let repository = GroupRepository::new(Arc::clone(&gateway));
        let poller = StatusPoller::new(repository.clone(), poll_interval);
        Self {
            gateway,
            repository,
            poller,
            write_lock: Mutex::new(()),
        }
    }

    /// Bring the remote group to the desired state and wait for it to
    /// settle.
    ///
    /// The whole sequence, convergence wait included, runs under the
    /// client's write lock. Errors abort the remainder of the sequence
    /// without compensation; the remote side keeps whatever partial mutation
    /// already succeeded, and a re-invocation reconciles from there.
    pub async fn apply(&self, spec: &GroupSpec, timeout: Duration) -> RpnResult<GroupId> {
        let _guard = self.write_lock.lock().await;

        let id = match spec {
            GroupSpec::Create {
                name,
                rpn_type,
                members,
            } => self.create(name, *rpn_type, members, timeout).await?,
            GroupSpec::Update {
                id,
                rpn_type,
                members,
            } => {
                self.update(*id, *rpn_type, members, timeout).await?;
                *id
            }
        };

        self.sync_vlans(id, spec.members()).await?;
        self.poller.wait_until_active(id, timeout).await?;

        info!(group = %id, "group reconciled");
        Ok(id)
    }

    /// Delete a group and wait for the removal to be observed.
    ///
    /// Deletion is idempotent with respect to the remote "group not found"
    /// error: the group may already be fully gone by the time the delete
    /// call or the follow-up poll observes it.
    pub async fn delete(&self, id: GroupId, timeout: Duration) -> RpnResult<()> {
        let _guard = self.write_lock.lock().await;

        info!(group = %id, "deleting group");
        match self.gateway.delete(&group_path(id), &[]).await {
            Ok(_) => {}
            Err(e) if e.is_group_not_found() => {
                debug!(group = %id, "group already gone");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        match self.poller.wait_until_active(id, timeout).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_group_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn create(
        &self,
        name: &str,
        rpn_type: RpnType,
        members: &[MemberSpec],
        timeout: Duration,
    ) -> RpnResult<GroupId> {
        let server_ids: Vec<ServerId> = members.iter().map(|m| m.server_id).collect();

        info!(name, r#type = %rpn_type, servers = server_ids.len(), "creating group");
        let form = [
            ("type", rpn_type.as_str().to_owned()),
            ("description", name.to_owned()),
            ("server_ids", serde_json::to_string(&server_ids)?),
        ];
        let body = self.gateway.post(RPN_ENDPOINT, &form).await?;
        let created: Group = serde_json::from_str(&body)?;

        // Membership has to settle before VLANs can be edited.
        self.poller.wait_until_active(created.id, timeout).await?;
        Ok(created.id)
    }

    async fn update(
        &self,
        id: GroupId,
        rpn_type: RpnType,
        members: &[MemberSpec],
        timeout: Duration,
    ) -> RpnResult<()> {
        let current = self.repository.get(id).await?;

        if current.rpn_type != rpn_type {
            return Err(RpnError::TypeImmutable {
                current: current.rpn_type,
                requested: rpn_type,
            });
        }

        let diff = diff_members(&current.members, members);
        debug!(
            group = %id,
            add = diff.to_add.len(),
            delete = diff.to_delete.len(),
            "membership diff computed"
        );

        // Add before delete: a resize that swaps one server for another must
        // not transiently shrink the group below its desired size.
        self.add_members(id, &diff.to_add).await?;
        self.remove_members(id, &diff.to_delete).await?;

        self.poller.wait_until_active(id, timeout).await
    }

    async fn add_members(&self, id: GroupId, server_ids: &[ServerId]) -> RpnResult<()> {
        if server_ids.is_empty() {
            return Ok(());
        }

        info!(group = %id, servers = ?server_ids, "adding members");
        let form = [("server_ids", serde_json::to_string(server_ids)?)];
        let body = self
            .gateway
            .post(&format!("{}/addMember", group_path(id)), &form)
            .await?;
        decode_ack(&body)
    }

    async fn remove_members(&self, id: GroupId, server_ids: &[ServerId]) -> RpnResult<()> {
        if server_ids.is_empty() {
            return Ok(());
        }

        info!(group = %id, servers = ?server_ids, "removing members");
        let form = [("server_ids", serde_json::to_string(server_ids)?)];
        let body = self
            .gateway
            .delete(&format!("{}/removeMember", group_path(id)), &form)
            .await?;
        decode_ack(&body)
    }

    /// Align member VLANs with the desired state.
    ///
    /// Works from a fresh snapshot so that members created earlier in the
    /// sequence carry their remote-assigned membership ids; the edit
    /// endpoint is addressed by membership id, not server id. Members whose
    /// VLAN already matches are skipped. Fails fast on the first error.
    async fn sync_vlans(&self, id: GroupId, desired: &[MemberSpec]) -> RpnResult<()> {
        let current = self.repository.get(id).await?;

        for want in desired {
            let Some(member) = current.member_by_server_id(want.server_id) else {
                continue;
            };
            if member.vlan == want.vlan {
                continue;
            }

            debug!(
                group = %id,
                member = %member.id,
                server = %want.server_id,
                vlan = want.vlan,
                "editing member vlan"
            );
            let form = [
                ("vlan_number", want.vlan.to_string()),
                ("reset_vlan", "false".to_owned()),
            ];
            let body = self
                .gateway
                .patch(
                    &format!("{}/editVlanMember/{}", group_path(id), member.id),
                    &form,
                )
                .await?;
            decode_ack(&body)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}
