use serde::{Deserialize, Serialize};

use super::Protocol;

/// Server-centric projection: one backend server with the service groups
/// that reference it and the virtual servers bound to those groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub backend_name: String,
    #[serde(default)]
    pub backend_address: String,
    #[serde(default)]
    pub backend_ports: Vec<BackendPort>,
    #[serde(default)]
    pub service_groups: Vec<BackendServiceGroup>,
    #[serde(default)]
    pub virtual_servers: Vec<BackendVirtualServer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendPort {
    #[serde(deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendServiceGroup {
    pub name: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub members: Vec<BackendMember>,
}

/// `(server, port)` member reference. An empty `name` means the enclosing
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMember {
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendVirtualServer {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub virtual_ports: Vec<BackendVirtualPort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendVirtualPort {
    #[serde(deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub service_group: String,
}

impl Backend {
    /// Ports requested for this backend, as appliance `(port, code)` pairs.
    pub fn port_codes(&self) -> Vec<(u16, u16)> {
        self.backend_ports
            .iter()
            .map(|p| (p.port, p.protocol.code()))
            .collect()
    }
}
