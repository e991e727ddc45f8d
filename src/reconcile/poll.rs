//! Polling for group settlement.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{RpnError, RpnResult};
use crate::repository::GroupRepository;
use crate::types::GroupId;

/// Polls a group until the remote side reports it fully applied.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    repository: GroupRepository,
    interval: Duration,
}

impl StatusPoller {
    /// Create a poller fetching through the given repository.
    #[must_use]
    pub fn new(repository: GroupRepository, interval: Duration) -> Self {
        Self {
            repository,
            interval,
        }
    }

    /// Block until the group and all of its members report ACTIVE, or the
    /// timeout elapses.
    ///
    /// The deadline is fixed at entry. Each iteration sleeps one interval,
    /// fetches, and only then checks the deadline, so the loop can overrun
    /// the deadline by up to one interval. Fetch errors propagate
    /// immediately; there is no cancellation beyond the deadline.
    pub async fn wait_until_active(&self, id: GroupId, timeout: Duration) -> RpnResult<()> {
        let deadline = Instant::now() + timeout;

        loop {
            sleep(self.interval).await;

            let group = self.repository.get(id).await?;
            if group.is_settled() {
                debug!(group = %id, "group settled");
                return Ok(());
            }

            if Instant::now() > deadline {
                return Err(RpnError::Timeout { group: id });
            }

            debug!(group = %id, status = %group.status, "group not settled yet");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gateway::MockGateway;

    const INTERVAL: Duration = Duration::from_millis(5);

    fn group_body(status: &str) -> String {
        format!(r#"{{"id": 1, "description": "g", "status": "{status}", "type": "STANDARD"}}"#)
    }

    fn poller(gateway: Arc<MockGateway>) -> StatusPoller {
        StatusPoller::new(GroupRepository::new(gateway), INTERVAL)
    }

    #[tokio::test]
    async fn settled_on_first_fetch() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond("GET", "/rpn/v2/1", group_body("ACTIVE"));

        let poller = poller(Arc::clone(&gateway));
        poller
            .wait_until_active(GroupId::new(1), Duration::from_secs(5))
            .await
            .unwrap();

        // One fetch, no second interval.
        assert_eq!(gateway.calls_to("GET", "/rpn/v2/1"), 1);
    }

    #[tokio::test]
    async fn settles_after_a_few_polls() {
        let gateway = Arc::new(MockGateway::new());
        gateway.enqueue("GET", "/rpn/v2/1", group_body("UPDATING"));
        gateway.enqueue("GET", "/rpn/v2/1", group_body("UPDATING"));
        gateway.respond("GET", "/rpn/v2/1", group_body("ACTIVE"));

        let poller = poller(Arc::clone(&gateway));
        poller
            .wait_until_active(GroupId::new(1), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(gateway.calls_to("GET", "/rpn/v2/1"), 3);
    }

    #[tokio::test]
    async fn times_out_without_further_fetches() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond("GET", "/rpn/v2/1", group_body("UPDATING"));

        let poller = poller(Arc::clone(&gateway));
        let err = poller
            .wait_until_active(GroupId::new(1), INTERVAL * 3)
            .await
            .unwrap_err();
        assert!(matches!(err, RpnError::Timeout { group } if group == GroupId::new(1)));

        let fetches = gateway.calls_to("GET", "/rpn/v2/1");
        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(gateway.calls_to("GET", "/rpn/v2/1"), fetches);
    }

    #[tokio::test]
    async fn non_active_member_blocks_settlement() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond(
            "GET",
            "/rpn/v2/1",
            r#"{"id": 1, "description": "g", "status": "ACTIVE", "type": "STANDARD",
                "member": [{"id": 7, "linked": {"id": 100}, "status": "PENDING", "vlan": 1}]}"#,
        );

        let poller = poller(gateway);
        let err = poller
            .wait_until_active(GroupId::new(1), INTERVAL * 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RpnError::Timeout { .. }));
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond_api_error("GET", "/rpn/v2/1", 4, "forbidden");

        let poller = poller(gateway);
        let err = poller
            .wait_until_active(GroupId::new(1), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RpnError::Api { code: 4, .. }));
    }
}
