// balance-core: topology model and reconciliation engine between the
// appliance clients (balance-api) and the HTTP service.

pub mod appliance;
pub mod backend;
pub mod config;
pub mod diff;
pub mod error;
pub mod f5;
pub mod model;
pub mod reconcile;
pub mod topology;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use appliance::{Action, Appliance, DryRun, Mutation, ObjectKind};
pub use backend::{
    BackendAction, BackendChange, link_backend, rebuild_member_list, unlink_backend, validate_link,
    validate_unlink,
};
pub use config::{AdapterOptions, ApplianceConfig, Credentials, TlsVerification};
pub use diff::{SetDiff, compare_sets};
pub use error::CoreError;
pub use f5::{F5Inventory, f5_inventory};
pub use reconcile::{MutationOutcome, Phase, ReconcileReport, Reconciler};
pub use topology::{Inventory, NameSets, fetch, find_pool, find_server, find_virtual, list_names};

pub use model::{
    Backend, BackendMember, BackendPort, BackendServiceGroup, BackendVirtualPort,
    BackendVirtualServer, Pool, Protocol, Server, ServerPort, VirtualServer,
};
