//! Single-call server operations.
//!
//! Plain request/response wrappers around the server-side endpoints:
//! hostname and reverse-DNS editing, rescue images, boot modes, failover IPs
//! and SSH keys. No reconciliation concerns here; errors propagate
//! unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RpnResult;
use crate::gateway::Gateway;
use crate::types::ServerId;

const SERVER_ENDPOINT: &str = "/server";

/// Kind of a server network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    /// Internet-facing interface.
    Public,
    /// RPN-facing interface.
    Private,
}

/// One network interface of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// IP address.
    pub address: String,
    /// MAC address.
    #[serde(default)]
    pub mac: String,
    /// Reverse DNS record.
    #[serde(default)]
    pub reverse: String,
    /// State of the switch port the interface is wired to.
    #[serde(rename = "switch_port_state", default)]
    pub switch_port_state: String,
    /// Interface kind.
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
}

/// A dedicated server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server identifier.
    pub id: ServerId,
    /// Hostname. The only field [`ServerClient::update`] writes directly.
    #[serde(default)]
    pub hostname: String,
    /// Commercial offer name.
    #[serde(default)]
    pub offer: String,
    /// Power state.
    #[serde(default)]
    pub power: String,
    /// Current boot mode.
    #[serde(rename = "boot_mode", default)]
    pub boot_mode: String,
    /// Network interfaces.
    #[serde(rename = "ip", default)]
    pub interfaces: Vec<Interface>,
}

impl Server {
    /// Find the first interface of the given kind.
    #[must_use]
    pub fn interface_by_type(&self, kind: InterfaceType) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.interface_type == kind)
    }
}

/// Login details for a server booted into rescue mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RescueCredentials {
    /// Login name.
    pub login: String,
    /// Password.
    pub password: String,
    /// Access protocol (usually ssh).
    #[serde(default)]
    pub protocol: String,
    /// Address to connect to.
    #[serde(default)]
    pub ip: String,
}

/// An account SSH key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SshKey {
    /// Key identifier.
    #[serde(rename = "uuid_ref")]
    pub uuid: String,
    /// Key description.
    #[serde(default)]
    pub description: String,
    /// Key fingerprint.
    #[serde(default)]
    pub fingerprint: String,
}

/// Server-side request/response operations.
#[derive(Clone)]
pub struct ServerClient {
    gateway: Arc<dyn Gateway>,
}

impl ServerClient {
    /// Create a server client on top of a gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetch a server by id.
    pub async fn get(&self, id: ServerId) -> RpnResult<Server> {
        let body = self
            .gateway
            .get(&format!("{SERVER_ENDPOINT}/{id}"))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Push the server's hostname, and the reverse record of its public
    /// interface when one is present.
    pub async fn update(&self, server: &Server) -> RpnResult<()> {
        let form = [("hostname", server.hostname.clone())];
        self.gateway
            .put(&format!("{SERVER_ENDPOINT}/{}", server.id), &form)
            .await?;

        let Some(public) = server.interface_by_type(InterfaceType::Public) else {
            return Ok(());
        };
        self.set_reverse(&public.address, &public.reverse).await
    }

    /// Set the reverse DNS record for an address.
    pub async fn set_reverse(&self, address: &str, reverse: &str) -> RpnResult<()> {
        let form = [
            ("address", address.to_owned()),
            ("reverse", reverse.to_owned()),
        ];
        self.gateway
            .post(&format!("{SERVER_ENDPOINT}/ip/edit"), &form)
            .await?;
        Ok(())
    }

    /// List the rescue images available for a server.
    pub async fn rescue_images(&self, id: ServerId) -> RpnResult<Vec<String>> {
        let body = self
            .gateway
            .get(&format!("{SERVER_ENDPOINT}/rescue_images/{id}"))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Reboot a server into rescue mode and return the access credentials.
    pub async fn boot_rescue(&self, id: ServerId, image: &str) -> RpnResult<RescueCredentials> {
        let form = [("image", image.to_owned())];
        let body = self
            .gateway
            .post(&format!("{SERVER_ENDPOINT}/boot/rescue/{id}"), &form)
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Reboot a server back into normal mode.
    pub async fn boot_normal(&self, id: ServerId) -> RpnResult<()> {
        self.gateway
            .post(&format!("{SERVER_ENDPOINT}/boot/normal/{id}"), &[])
            .await?;
        Ok(())
    }

    /// Point a failover IP at a destination server address.
    pub async fn edit_failover(&self, source: &str, destination: &str) -> RpnResult<()> {
        let form = [
            ("source", source.to_owned()),
            ("destination", destination.to_owned()),
        ];
        self.gateway
            .post(&format!("{SERVER_ENDPOINT}/failover/edit"), &form)
            .await?;
        Ok(())
    }

    /// Generate a virtual MAC for a failover IP. Returns the MAC as reported
    /// by the API.
    pub async fn generate_failover_mac(
        &self,
        address: &str,
        mac_type: &str,
    ) -> RpnResult<String> {
        let form = [
            ("address", address.to_owned()),
            ("type", mac_type.to_owned()),
        ];
        self.gateway
            .post(&format!("{SERVER_ENDPOINT}/failover/generateMac"), &form)
            .await
    }

    /// Delete the virtual MAC of a failover IP.
    pub async fn delete_failover_mac(&self, address: &str) -> RpnResult<()> {
        let form = [("address", address.to_owned())];
        self.gateway
            .post(&format!("{SERVER_ENDPOINT}/failover/deleteMac"), &form)
            .await?;
        Ok(())
    }

    /// List the account's SSH keys.
    pub async fn ssh_keys(&self) -> RpnResult<Vec<SshKey>> {
        let body = self.gateway.get("/user/key").await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for ServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerClient").finish_non_exhaustive()
    }
}
