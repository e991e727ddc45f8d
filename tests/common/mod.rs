//! Common test utilities for reconciliation integration tests.

use std::sync::Arc;
use std::time::Duration;

use rpn_control::{Gateway, MockGateway, RpnClient};

/// Poll interval used by test clients; short enough to keep converge waits
/// cheap.
pub const INTERVAL: Duration = Duration::from_millis(5);

/// Wait budget that tests are never expected to exhaust.
pub const WAIT: Duration = Duration::from_secs(5);

/// Client wired to a scripted gateway.
pub struct TestClient {
    pub gateway: Arc<MockGateway>,
    pub client: RpnClient,
}

impl TestClient {
    pub fn new() -> Self {
        let gateway = Arc::new(MockGateway::new());
        let shared: Arc<dyn Gateway> = gateway.clone();
        let client = RpnClient::with_gateway(shared, INTERVAL);
        Self { gateway, client }
    }
}

/// Render a group body with the given members, each a
/// `(member_id, server_id, status, vlan)` tuple.
pub fn group_body(
    id: i64,
    status: &str,
    rpn_type: &str,
    members: &[(i64, i64, &str, u16)],
) -> String {
    let members: Vec<serde_json::Value> = members
        .iter()
        .map(|(member_id, server_id, status, vlan)| {
            serde_json::json!({
                "id": member_id,
                "linked": {"id": server_id, "ip": format!("10.90.0.{server_id}"), "type": "dedibox"},
                "status": status,
                "vlan": vlan,
            })
        })
        .collect();

    serde_json::json!({
        "id": id,
        "description": format!("group-{id}"),
        "status": status,
        "type": rpn_type,
        "compatibility_rpn_v1": false,
        "member": members,
    })
    .to_string()
}
