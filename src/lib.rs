//! RPN group management for Online.net dedicated servers.
//!
//! The remote control plane applies membership and VLAN changes
//! asynchronously: a mutation call returns immediately and the change only
//! becomes visible once the group and its members report `ACTIVE`. This
//! crate wraps that API with a reconciling client: callers describe the
//! state they want, and the client computes the minimal mutation set against
//! a fresh remote snapshot, applies it in a safe order and polls until the
//! change has taken effect.
//!
//! # Architecture
//!
//! - [`gateway`] — authenticated HTTP verb primitives and response/error
//!   decoding; everything else talks to the API through the
//!   [`Gateway`](gateway::Gateway) trait.
//! - [`repository`] — read-only group lookups (by id, by name, list).
//! - [`diff`] — pure membership diffing between a snapshot and a desired
//!   state.
//! - [`reconcile`] — the write path: create-or-update orchestration, VLAN
//!   synchronization and settlement polling, serialized per client instance.
//! - [`server`] — single-call server operations (hostname, reverse DNS,
//!   rescue, failover, SSH keys).
//! - [`client`] — the [`RpnClient`] facade tying the above together.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use rpn_control::{ApiConfig, GroupSpec, MemberSpec, RpnClient, RpnType, ServerId};
//!
//! # async fn run() -> rpn_control::RpnResult<()> {
//! let client = RpnClient::new(&ApiConfig::load()?)?;
//!
//! let spec = GroupSpec::Create {
//!     name: "storage".to_owned(),
//!     rpn_type: RpnType::Standard,
//!     members: vec![
//!         MemberSpec::new(ServerId::new(100), 2001),
//!         MemberSpec::new(ServerId::new(101), 2001),
//!     ],
//! };
//!
//! // Blocks until the group and all members report ACTIVE, or times out.
//! let id = client.apply(&spec, Duration::from_secs(60)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod gateway;
pub mod reconcile;
pub mod repository;
pub mod server;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::RpnClient;
pub use config::ApiConfig;
pub use diff::{diff_members, MemberDiff};
pub use error::{RpnError, RpnResult, GROUP_NOT_FOUND_CODE};
pub use gateway::{Gateway, HttpGateway, MockGateway};
pub use reconcile::{Reconciler, StatusPoller};
pub use repository::GroupRepository;
pub use server::{RescueCredentials, Server, ServerClient, SshKey};
pub use types::{
    Group, GroupId, GroupSpec, Member, MemberId, MemberSpec, RpnType, ServerId, STATUS_ACTIVE,
};
