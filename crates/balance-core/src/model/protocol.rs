// ── Protocol ──
//
// Normalized transport protocol. Appliance codes are 2=tcp, 3=udp; any other
// code is carried as `Unknown(code)` and written back unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

const CODE_TCP: u16 = 2;
const CODE_UDP: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    /// Appliance code with no known name, rendered `unknown:<code>`.
    Unknown(u16),
}

impl Protocol {
    /// Map an appliance protocol code.
    pub fn from_code(code: u16) -> Self {
        match code {
            CODE_TCP => Self::Tcp,
            CODE_UDP => Self::Udp,
            other => Self::Unknown(other),
        }
    }

    /// Appliance protocol code.
    pub fn code(self) -> u16 {
        match self {
            Self::Tcp => CODE_TCP,
            Self::Udp => CODE_UDP,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
            Self::Unknown(code) => write!(f, "unknown:{code}"),
        }
    }
}

impl FromStr for Protocol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => other
                .strip_prefix("unknown:")
                .and_then(|code| code.parse::<u16>().ok())
                .map(Self::from_code)
                .ok_or_else(|| CoreError::UnknownProtocol {
                    value: s.to_owned(),
                }),
        }
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
