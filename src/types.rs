//! Core types for rpn-control.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status string reported by the remote API once a change has fully applied.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Remote-assigned identifier of an RPN group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a dedicated server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(i64);

impl ServerId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote-assigned identifier of one server's membership within a group.
///
/// Distinct from [`ServerId`]: the VLAN edit endpoint is addressed by
/// membership id, not by the underlying server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(i64);

impl MemberId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RPN group type. Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpnType {
    /// Regular private network.
    #[serde(rename = "STANDARD")]
    Standard,
    /// 802.1ad stacked-VLAN network.
    #[serde(rename = "QINQ")]
    QinQ,
    /// Trial network.
    #[serde(rename = "DEMO")]
    Demo,
}

impl RpnType {
    /// Wire representation of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::QinQ => "QINQ",
            Self::Demo => "DEMO",
        }
    }
}

impl fmt::Display for RpnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The server a membership record points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedServer {
    /// Server identifier.
    pub id: ServerId,
    /// RPN-side IP address of the server.
    #[serde(default)]
    pub ip: String,
    /// Server offer type.
    #[serde(rename = "type", default)]
    pub server_type: String,
    /// API reference path for the server resource.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// One server's membership record within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Remote-assigned membership identifier.
    pub id: MemberId,
    /// The underlying server.
    pub linked: LinkedServer,
    /// Membership status as reported by the remote API.
    #[serde(default)]
    pub status: String,
    /// VLAN number assigned to this member.
    #[serde(default)]
    pub vlan: u16,
}

impl Member {
    /// Whether the remote side reports this membership as fully applied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// An RPN group as reported by the remote API.
///
/// Always an authoritative snapshot: ids, statuses and membership ids are
/// assigned remotely and never constructed by callers. Desired state is
/// expressed through [`GroupSpec`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Remote-assigned group identifier.
    pub id: GroupId,
    /// Human-readable group name.
    #[serde(rename = "description")]
    pub name: String,
    /// Group status as reported by the remote API.
    #[serde(default)]
    pub status: String,
    /// Group type. Never changes once the group exists.
    #[serde(rename = "type")]
    pub rpn_type: RpnType,
    /// Whether the group is bridged with legacy RPNv1 networks.
    #[serde(rename = "compatibility_rpn_v1", default)]
    pub compatibility_rpn_v1: bool,
    /// Membership records, one per server.
    #[serde(rename = "member", default)]
    pub members: Vec<Member>,
}

impl Group {
    /// Find the membership record referencing the given server.
    #[must_use]
    pub fn member_by_server_id(&self, id: ServerId) -> Option<&Member> {
        self.members.iter().find(|m| m.linked.id == id)
    }

    /// Whether the group and every one of its members report ACTIVE.
    ///
    /// A group with no members only needs the group-level status.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == STATUS_ACTIVE && self.members.iter().all(Member::is_active)
    }
}

/// Desired membership of one server within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSpec {
    /// Server that should be a member.
    pub server_id: ServerId,
    /// VLAN number the membership should carry.
    pub vlan: u16,
}

impl MemberSpec {
    /// Desired membership for a server.
    #[must_use]
    pub const fn new(server_id: ServerId, vlan: u16) -> Self {
        Self { server_id, vlan }
    }
}

/// Desired state of a group, as submitted to the reconciler.
///
/// Creation and update are distinct variants rather than a zero-valued id
/// sentinel, so a spec is always explicit about whether the group is
/// expected to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSpec {
    /// The group does not exist yet and should be created.
    Create {
        /// Name for the new group.
        name: String,
        /// Type of the new group.
        rpn_type: RpnType,
        /// Desired membership.
        members: Vec<MemberSpec>,
    },
    /// The group exists and should be brought to this state.
    Update {
        /// Remote identifier of the existing group.
        id: GroupId,
        /// Expected type. Must match the remote snapshot; a mismatch is a
        /// validation error, not a mutation.
        rpn_type: RpnType,
        /// Desired membership.
        members: Vec<MemberSpec>,
    },
}

impl GroupSpec {
    /// Desired membership of the group.
    #[must_use]
    pub fn members(&self) -> &[MemberSpec] {
        match self {
            Self::Create { members, .. } | Self::Update { members, .. } => members,
        }
    }

    /// Desired group type.
    #[must_use]
    pub const fn rpn_type(&self) -> RpnType {
        match self {
            Self::Create { rpn_type, .. } | Self::Update { rpn_type, .. } => *rpn_type,
        }
    }
}
