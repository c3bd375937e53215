// ── F5 inventory ──
//
// Read-only LTM summary. Every object is logged; nothing is reconciled.

use balance_api::F5Client;
use balance_api::f5::models::{F5Node, F5Virtual};
use serde::Serialize;
use tracing::info;

use crate::error::CoreError;

#[derive(Debug, Clone, Serialize)]
pub struct F5PoolSummary {
    pub name: String,
    pub partition: String,
    /// Member names (`node:port`).
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct F5Inventory {
    pub virtual_servers: Vec<F5Virtual>,
    pub pools: Vec<F5PoolSummary>,
    pub nodes: Vec<F5Node>,
}

/// List virtual servers, pools and nodes. Any list failure is a gateway
/// error.
pub async fn f5_inventory(client: &F5Client, username: &str) -> Result<F5Inventory, CoreError> {
    let virtual_servers = client
        .list_virtuals()
        .await
        .map_err(|e| CoreError::gateway("virtual list", &e))?;
    let pools = client
        .list_pools()
        .await
        .map_err(|e| CoreError::gateway("pool list", &e))?;
    let nodes = client
        .list_nodes()
        .await
        .map_err(|e| CoreError::gateway("node list", &e))?;

    for v in &virtual_servers {
        info!(
            user = username,
            virtual_server = %v.name,
            destination = %v.destination,
            pool = %v.pool,
            partition = %v.partition,
            "f5 virtual server"
        );
    }

    let pools: Vec<F5PoolSummary> = pools
        .iter()
        .map(|p| F5PoolSummary {
            name: p.name.clone(),
            partition: p.partition.clone(),
            members: p.members().iter().map(|m| m.name.clone()).collect(),
        })
        .collect();
    for p in &pools {
        info!(user = username, name = %p.name, members = ?p.members, "f5 pool");
    }

    for n in &nodes {
        info!(user = username, name = %n.name, address = %n.address, state = %n.state, "f5 node");
    }

    Ok(F5Inventory {
        virtual_servers,
        pools,
        nodes,
    })
}
