// A10 axAPI v2.1 wire types
//
// Typed request/response bodies for the `slb.*` methods. Numeric fields are
// numbers on the wire (ports and protocol codes); fields use
// `#[serde(default)]` because firmware releases disagree on which keys are
// always present.

use serde::{Deserialize, Serialize};

// ── Status envelope ──────────────────────────────────────────────────

/// Status envelope returned by mutations and by failed calls:
/// ```json
/// { "response": { "status": "fail", "err": { "code": 1023, "msg": "..." } } }
/// ```
#[derive(Debug, Deserialize)]
pub struct AxapiStatus {
    pub response: AxapiStatusInner,
}

#[derive(Debug, Deserialize)]
pub struct AxapiStatusInner {
    pub status: String,
    #[serde(default)]
    pub err: Option<AxapiErr>,
}

#[derive(Debug, Deserialize)]
pub struct AxapiErr {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Response of `method=authenticate`.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub session_id: String,
}

// ── Server ───────────────────────────────────────────────────────────

/// `slb.server` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10Server {
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port_list: Vec<A10ServerPort>,
}

/// One entry of a server's `port_list`. `protocol`: 2=tcp, 3=udp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10ServerPort {
    pub port_num: u16,
    #[serde(default)]
    pub protocol: u16,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerList {
    #[serde(default)]
    pub server_list: Vec<A10Server>,
}

// ── Service group ────────────────────────────────────────────────────

/// `slb.service_group` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10ServiceGroup {
    pub name: String,
    #[serde(default)]
    pub protocol: u16,
    #[serde(default)]
    pub member_list: Vec<A10Member>,
}

/// Service group member: a `(server, port)` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10Member {
    pub server: String,
    pub port: u16,
    /// Protocol code of the referenced server port, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceGroupList {
    #[serde(default)]
    pub service_group_list: Vec<A10ServiceGroup>,
}

// ── Virtual server ───────────────────────────────────────────────────

/// `slb.virtual_server` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10VirtualServer {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub vport_list: Vec<A10VirtualPort>,
}

/// Virtual port: a listen `(port, protocol)` bound to one service group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A10VirtualPort {
    pub port: u16,
    #[serde(default)]
    pub protocol: u16,
    #[serde(default)]
    pub service_group: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VirtualServerList {
    #[serde(default)]
    pub virtual_server_list: Vec<A10VirtualServer>,
}
