use serde::{Deserialize, Serialize};

use super::Protocol;

/// A listening endpoint forwarding to one or more pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualServer {
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Primary listen port: the first virtual port seen on fetch, and the
    /// default for pools without a port of their own when pushed.
    #[serde(default, deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub pools: Vec<Pool>,
}

/// A service group. `port`/`protocol` describe the virtual port binding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    #[serde(default, deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub members: Vec<Server>,
}

/// A backend host. Inside a pool, `ports` are the member ports the group
/// references rather than every port the server defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ports: Vec<ServerPort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerPort {
    #[serde(deserialize_with = "crate::model::port::deserialize")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
}

impl VirtualServer {
    /// Listen `(port, protocol)` used when pushing `pool` under this server.
    pub fn binding_for(&self, pool: &Pool) -> (u16, Protocol) {
        let port = if pool.port == 0 { self.port } else { pool.port };
        (port, pool.protocol.unwrap_or(self.protocol))
    }
}
