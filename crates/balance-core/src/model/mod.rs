// ── Domain model ──
//
// Vendor-neutral topology types. Built fresh from appliance lists on every
// request and serialized with `snake_case` field names.

mod backend;
mod protocol;
mod virtual_server;

pub use backend::{Backend, BackendMember, BackendPort, BackendServiceGroup, BackendVirtualPort, BackendVirtualServer};
pub use protocol::Protocol;
pub use virtual_server::{Pool, Server, ServerPort, VirtualServer};

/// Serde helpers for ports that arrive as numbers or numeric strings.
pub(crate) mod port {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<u16, E> {
        let value = match raw {
            Raw::Number(n) => n,
            Raw::Text(s) if s.trim().is_empty() => 0,
            Raw::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("invalid port {s:?}")))?,
        };
        u16::try_from(value).map_err(|_| E::custom(format!("port {value} out of range")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }
}
