//! Integration tests for the group write path.

mod common;

use common::{group_body, TestClient, WAIT};

use rpn_control::{GroupId, GroupSpec, MemberSpec, RpnError, RpnType, ServerId};

fn update_spec(id: i64, rpn_type: RpnType, members: &[(i64, u16)]) -> GroupSpec {
    GroupSpec::Update {
        id: GroupId::new(id),
        rpn_type,
        members: members
            .iter()
            .map(|(server_id, vlan)| MemberSpec::new(ServerId::new(*server_id), *vlan))
            .collect(),
    }
}

#[tokio::test]
async fn noop_update_issues_no_mutation_calls() {
    let t = TestClient::new();
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(
            1,
            "ACTIVE",
            "STANDARD",
            &[(70, 100, "ACTIVE", 2001), (71, 101, "ACTIVE", 2001)],
        ),
    );

    let spec = update_spec(1, RpnType::Standard, &[(100, 2001), (101, 2001)]);
    t.client.apply(&spec, WAIT).await.unwrap();

    // Reads only: empty diff and matching VLANs mean no network mutation.
    assert!(t.gateway.calls().iter().all(|c| c.method == "GET"));
}

#[tokio::test]
async fn type_mismatch_fails_before_any_mutation() {
    let t = TestClient::new();
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(1, "ACTIVE", "STANDARD", &[(70, 100, "ACTIVE", 2001)]),
    );

    let spec = update_spec(1, RpnType::QinQ, &[(100, 2001)]);
    let err = t.client.apply(&spec, WAIT).await.unwrap_err();
    assert!(matches!(
        err,
        RpnError::TypeImmutable {
            current: RpnType::Standard,
            requested: RpnType::QinQ,
        }
    ));

    // The snapshot fetch is the only request issued.
    let calls = t.gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "GET");
}

#[tokio::test]
async fn resize_adds_before_deleting() {
    let t = TestClient::new();
    // First snapshot holds the pre-resize membership.
    t.gateway.enqueue(
        "GET",
        "/rpn/v2/1",
        group_body(
            1,
            "ACTIVE",
            "STANDARD",
            &[
                (70, 1, "ACTIVE", 0),
                (71, 2, "ACTIVE", 0),
                (72, 3, "ACTIVE", 0),
            ],
        ),
    );
    // Every later fetch observes the post-resize membership, settled.
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(
            1,
            "ACTIVE",
            "STANDARD",
            &[
                (71, 2, "ACTIVE", 0),
                (72, 3, "ACTIVE", 0),
                (73, 4, "ACTIVE", 0),
            ],
        ),
    );
    t.gateway.respond("POST", "/rpn/v2/1/addMember", "true");
    t.gateway.respond("DELETE", "/rpn/v2/1/removeMember", "true");

    let spec = update_spec(1, RpnType::Standard, &[(2, 0), (3, 0), (4, 0)]);
    t.client.apply(&spec, WAIT).await.unwrap();

    let calls = t.gateway.calls();
    let add = calls
        .iter()
        .position(|c| c.path == "/rpn/v2/1/addMember")
        .expect("addMember call");
    let remove = calls
        .iter()
        .position(|c| c.path == "/rpn/v2/1/removeMember")
        .expect("removeMember call");
    assert!(add < remove, "members must be added before any are removed");

    assert_eq!(calls[add].form, vec![("server_ids".to_owned(), "[4]".to_owned())]);
    assert_eq!(calls[remove].form, vec![("server_ids".to_owned(), "[1]".to_owned())]);
}

#[tokio::test]
async fn vlan_sync_touches_only_divergent_members() {
    let t = TestClient::new();
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(
            1,
            "ACTIVE",
            "STANDARD",
            &[(70, 100, "ACTIVE", 2001), (71, 101, "ACTIVE", 1500)],
        ),
    );
    t.gateway
        .respond("PATCH", "/rpn/v2/1/editVlanMember/71", "true");

    let spec = update_spec(1, RpnType::Standard, &[(100, 2001), (101, 2001)]);
    t.client.apply(&spec, WAIT).await.unwrap();

    let patches: Vec<_> = t
        .gateway
        .calls()
        .into_iter()
        .filter(|c| c.method == "PATCH")
        .collect();
    // Exactly one edit, addressed by membership id (71), not server id (101).
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].path, "/rpn/v2/1/editVlanMember/71");
    assert_eq!(
        patches[0].form,
        vec![
            ("vlan_number".to_owned(), "2001".to_owned()),
            ("reset_vlan".to_owned(), "false".to_owned()),
        ]
    );
}

#[tokio::test]
async fn vlan_edit_failure_aborts_the_sequence() {
    let t = TestClient::new();
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(1, "ACTIVE", "STANDARD", &[(70, 100, "ACTIVE", 1500)]),
    );
    t.gateway
        .enqueue_api_error("PATCH", "/rpn/v2/1/editVlanMember/70", 12, "vlan in use");

    let spec = update_spec(1, RpnType::Standard, &[(100, 2001)]);
    let err = t.client.apply(&spec, WAIT).await.unwrap_err();
    assert!(matches!(err, RpnError::Api { code: 12, .. }));
}

#[tokio::test]
async fn update_converges_through_transitional_states() {
    let t = TestClient::new();
    t.gateway.enqueue(
        "GET",
        "/rpn/v2/1",
        group_body(1, "ACTIVE", "STANDARD", &[(70, 100, "ACTIVE", 0)]),
    );
    t.gateway.respond("POST", "/rpn/v2/1/addMember", "true");
    // The new member stays PENDING for two polls before settling.
    for _ in 0..2 {
        t.gateway.enqueue(
            "GET",
            "/rpn/v2/1",
            group_body(
                1,
                "UPDATING",
                "STANDARD",
                &[(70, 100, "ACTIVE", 0), (73, 101, "PENDING", 0)],
            ),
        );
    }
    t.gateway.respond(
        "GET",
        "/rpn/v2/1",
        group_body(
            1,
            "ACTIVE",
            "STANDARD",
            &[(70, 100, "ACTIVE", 0), (73, 101, "ACTIVE", 0)],
        ),
    );

    let spec = update_spec(1, RpnType::Standard, &[(100, 0), (101, 0)]);
    t.client.apply(&spec, WAIT).await.unwrap();
}

#[tokio::test]
async fn concurrent_applies_do_not_interleave() {
    let t = TestClient::new();
    for id in [1, 2] {
        t.gateway.respond(
            "GET",
            &format!("/rpn/v2/{id}"),
            group_body(id, "ACTIVE", "STANDARD", &[(70, 100, "ACTIVE", 0)]),
        );
    }

    let first = update_spec(1, RpnType::Standard, &[(100, 0)]);
    let second = update_spec(2, RpnType::Standard, &[(100, 0)]);
    let (a, b) = tokio::join!(
        t.client.apply(&first, WAIT),
        t.client.apply(&second, WAIT)
    );
    a.unwrap();
    b.unwrap();

    // Whole sequences are serialized by the write lock: once calls switch
    // from one group to the other, they never switch back.
    let paths: Vec<String> = t.gateway.calls().into_iter().map(|c| c.path).collect();
    let switches = paths.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(
        switches, 1,
        "interleaved write sequences observed: {paths:?}"
    );
}
