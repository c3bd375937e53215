// ── Topology fetcher ──
//
// Pulls the three appliance lists and indexes them by name. Cross-references
// (group -> server, virtual port -> group) are resolved lazily by the views;
// a dangling reference is logged and skipped, never fatal.

mod lookup;
mod views;

use balance_api::a10::models::{A10Server, A10ServiceGroup, A10VirtualServer};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::appliance::Appliance;
use crate::error::CoreError;

pub use lookup::{NameSets, find_pool, find_server, find_virtual, list_names};

/// Name-indexed snapshot of an appliance's SLB objects, in appliance order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub servers: IndexMap<String, A10Server>,
    pub groups: IndexMap<String, A10ServiceGroup>,
    pub virtual_servers: IndexMap<String, A10VirtualServer>,
}

impl Inventory {
    /// Index raw lists. A repeated name keeps its first occurrence.
    pub fn from_lists(
        servers: Vec<A10Server>,
        groups: Vec<A10ServiceGroup>,
        virtual_servers: Vec<A10VirtualServer>,
    ) -> Self {
        Self {
            servers: index_by_name("server", servers, |s| &s.name),
            groups: index_by_name("service group", groups, |g| &g.name),
            virtual_servers: index_by_name("virtual server", virtual_servers, |v| &v.name),
        }
    }
}

fn index_by_name<T>(
    kind: &'static str,
    items: Vec<T>,
    name: impl Fn(&T) -> &String,
) -> IndexMap<String, T> {
    let mut index = IndexMap::with_capacity(items.len());
    for item in items {
        let key = name(&item).clone();
        if index.contains_key(&key) {
            warn!(kind, name = %key, "duplicate name in appliance list, keeping first");
            continue;
        }
        index.insert(key, item);
    }
    index
}

/// Retrieve servers, service groups and virtual servers. Any list failure
/// is a gateway error.
pub async fn fetch<A: Appliance + ?Sized>(appliance: &A) -> Result<Inventory, CoreError> {
    let servers = appliance
        .list_servers()
        .await
        .map_err(|e| CoreError::gateway("list servers", &e))?;
    let groups = appliance
        .list_service_groups()
        .await
        .map_err(|e| CoreError::gateway("list service groups", &e))?;
    let virtual_servers = appliance
        .list_virtual_servers()
        .await
        .map_err(|e| CoreError::gateway("list virtual servers", &e))?;

    debug!(
        servers = servers.len(),
        groups = groups.len(),
        virtual_servers = virtual_servers.len(),
        "fetched appliance lists"
    );

    Ok(Inventory::from_lists(servers, groups, virtual_servers))
}
