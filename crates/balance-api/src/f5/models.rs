// F5 iControl REST LTM response types
//
// Only the fields the adapter reports on are modeled; iControl returns many
// more and unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// iControl collection wrapper: `{ "kind": "...", "items": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct F5Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `ltm/virtual` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct F5Virtual {
    pub name: String,
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub pool: String,
}

/// `ltm/pool` item with its members expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct F5Pool {
    pub name: String,
    #[serde(default)]
    pub partition: String,
    #[serde(default, skip_serializing)]
    pub members_reference: Option<F5MembersReference>,
}

impl F5Pool {
    /// Expanded member list (empty when the pool has no members).
    pub fn members(&self) -> &[F5PoolMember] {
        self.members_reference
            .as_ref()
            .map_or(&[], |r| r.items.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct F5MembersReference {
    #[serde(default)]
    pub items: Vec<F5PoolMember>,
}

/// Pool member: `name` is `<node>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct F5PoolMember {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub state: String,
}

/// `ltm/node` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct F5Node {
    pub name: String,
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub state: String,
}
