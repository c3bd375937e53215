// ── Topology reconciler ──
//
// Moves the appliance from an observed virtual view to a desired one in
// nine ordered phases: deletes top-down (virtual servers, groups, servers),
// then updates and creates bottom-up (servers, groups, virtual servers), so
// no object is ever created before the objects it references. A failed
// mutation is counted and logged; later phases still run.

use balance_api::a10::models::{A10Member, A10Server, A10ServerPort, A10ServiceGroup, A10VirtualPort, A10VirtualServer};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info, warn};

use crate::appliance::{Action, Appliance, Mutation, ObjectKind};
use crate::config::AdapterOptions;
use crate::diff::{SetDiff, compare_sets};
use crate::model::{Pool, Protocol, Server, VirtualServer};
use crate::topology::{find_pool, find_server, find_virtual, list_names};

/// Reconcile phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    DeleteVirtualServers,
    DeletePools,
    DeleteServers,
    UpdateServers,
    CreateServers,
    UpdatePools,
    CreatePools,
    UpdateVirtualServers,
    CreateVirtualServers,
}

impl Phase {
    fn action(self) -> Action {
        match self {
            Self::DeleteVirtualServers | Self::DeletePools | Self::DeleteServers => Action::Delete,
            Self::UpdateServers | Self::UpdatePools | Self::UpdateVirtualServers => Action::Update,
            Self::CreateServers | Self::CreatePools | Self::CreateVirtualServers => Action::Create,
        }
    }

    fn object(self) -> ObjectKind {
        match self {
            Self::DeleteServers | Self::UpdateServers | Self::CreateServers => ObjectKind::Server,
            Self::DeletePools | Self::UpdatePools | Self::CreatePools => ObjectKind::ServiceGroup,
            Self::DeleteVirtualServers | Self::UpdateVirtualServers | Self::CreateVirtualServers => {
                ObjectKind::VirtualServer
            }
        }
    }
}

/// Result of one attempted mutation.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub phase: Phase,
    pub mutation: Mutation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Every mutation a reconcile attempted, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<MutationOutcome>,
}

impl ReconcileReport {
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    /// Mutations in the order they were sent.
    pub fn mutations(&self) -> impl Iterator<Item = &Mutation> {
        self.outcomes.iter().map(|o| &o.mutation)
    }
}

struct Plan {
    servers: SetDiff,
    groups: SetDiff,
    virtual_servers: SetDiff,
}

pub struct Reconciler<'a, A: Appliance + ?Sized> {
    appliance: &'a A,
    options: AdapterOptions,
}

impl<'a, A: Appliance + ?Sized> Reconciler<'a, A> {
    pub fn new(appliance: &'a A, options: AdapterOptions) -> Self {
        Self { appliance, options }
    }

    /// Apply the mutations that turn `old` into `new`.
    pub async fn reconcile(&self, old: &[VirtualServer], new: &[VirtualServer]) -> ReconcileReport {
        let before = list_names(old);
        let after = list_names(new);
        let plan = Plan {
            servers: compare_sets(&before.servers, &after.servers),
            groups: compare_sets(&before.groups, &after.groups),
            virtual_servers: compare_sets(&before.virtual_servers, &after.virtual_servers),
        };

        let live = if plan.servers.both.is_empty() {
            LiveServers::default()
        } else {
            LiveServers::fetch(self.appliance, old).await
        };

        let mut report = ReconcileReport::default();
        for phase in Phase::iter() {
            let names = Self::names_for(&plan, phase);
            info!(%phase, count = names.len(), dry_run = self.options.dry_run, "reconcile phase");
            for name in names {
                self.apply(phase, name, new, &live, &mut report).await;
            }
        }

        info!(
            mutations = report.outcomes.len(),
            errors = report.error_count(),
            "reconcile done"
        );
        report
    }

    fn names_for(plan: &Plan, phase: Phase) -> &[String] {
        let diff = match phase.object() {
            ObjectKind::Server => &plan.servers,
            ObjectKind::ServiceGroup => &plan.groups,
            ObjectKind::VirtualServer => &plan.virtual_servers,
        };
        match phase.action() {
            Action::Delete => &diff.only_existing,
            Action::Update => &diff.both,
            Action::Create => &diff.only_desired,
        }
    }

    async fn apply(
        &self,
        phase: Phase,
        name: &str,
        new: &[VirtualServer],
        live: &LiveServers,
        report: &mut ReconcileReport,
    ) {
        let action = phase.action();
        let object = phase.object();
        let sent = |r: Result<(), balance_api::Error>| r.map_err(|e| e.to_string());
        let result = match (action, object) {
            (Action::Delete, ObjectKind::VirtualServer) => sent(self.appliance.delete_virtual_server(name).await),
            (Action::Delete, ObjectKind::ServiceGroup) => sent(self.appliance.delete_service_group(name).await),
            (Action::Delete, ObjectKind::Server) => sent(self.appliance.delete_server(name).await),
            (Action::Create, ObjectKind::Server) => {
                let Some(server) = find_server(new, name) else {
                    warn!(%phase, name, "server missing from desired view, skipping");
                    return;
                };
                let server = server_to_a10(&server);
                self.trace_payload(phase, &server);
                sent(self.appliance.create_server(&server).await)
            }
            (Action::Update, ObjectKind::Server) => {
                let Some(server) = find_server(new, name) else {
                    warn!(%phase, name, "server missing from desired view, skipping");
                    return;
                };
                let mut server = server_to_a10(&server);
                match live.keep_hidden_ports(&mut server) {
                    Ok(()) => {
                        self.trace_payload(phase, &server);
                        sent(self.appliance.update_server(&server).await)
                    }
                    Err(reason) => Err(reason),
                }
            }
            (_, ObjectKind::ServiceGroup) => {
                let Some(pool) = find_pool(new, name) else {
                    warn!(%phase, name, "pool missing from desired view, skipping");
                    return;
                };
                let group = pool_to_a10(&pool);
                self.trace_payload(phase, &group);
                if action == Action::Create {
                    sent(self.appliance.create_service_group(&group).await)
                } else {
                    sent(self.appliance.update_service_group(&group).await)
                }
            }
            (_, ObjectKind::VirtualServer) => {
                let Some(vs) = find_virtual(new, name) else {
                    warn!(%phase, name, "virtual server missing from desired view, skipping");
                    return;
                };
                let vs = virtual_to_a10(vs);
                self.trace_payload(phase, &vs);
                if action == Action::Create {
                    sent(self.appliance.create_virtual_server(&vs).await)
                } else {
                    sent(self.appliance.update_virtual_server(&vs).await)
                }
            }
        };

        let mutation = Mutation::new(action, object, name);
        let error = match result {
            Ok(()) => {
                debug!(%phase, %mutation, "mutation applied");
                None
            }
            Err(e) => {
                warn!(%phase, %mutation, error = %e, "mutation failed");
                Some(e)
            }
        };
        report.outcomes.push(MutationOutcome {
            phase,
            mutation,
            error,
        });
    }

    /// With `debug` on, log every payload before it is pushed.
    fn trace_payload(&self, phase: Phase, payload: &impl std::fmt::Debug) {
        if self.options.debug {
            info!(%phase, ?payload, "payload");
        }
    }
}

// ── Live server ports ────────────────────────────────────────────────

/// Server ports the observed view cannot show because no group member
/// references them. A server update replaces the whole port list, so these
/// are appended to every update payload.
#[derive(Debug, Default)]
struct LiveServers {
    hidden: IndexMap<String, Vec<A10ServerPort>>,
    unavailable: Option<String>,
}

impl LiveServers {
    async fn fetch<A: Appliance + ?Sized>(appliance: &A, old: &[VirtualServer]) -> Self {
        let servers = match appliance.list_servers().await {
            Ok(servers) => servers,
            Err(e) => {
                warn!(error = %e, "live server list failed, server updates will not be sent");
                return Self {
                    hidden: IndexMap::new(),
                    unavailable: Some(format!("live server list failed: {e}")),
                };
            }
        };

        let mut hidden = IndexMap::new();
        for live in servers {
            let shown = find_server(old, &live.name)
                .map(|s| server_to_a10(&s).port_list)
                .unwrap_or_default();
            let ports: Vec<A10ServerPort> = live
                .port_list
                .into_iter()
                .filter(|p| !shown.contains(p))
                .collect();
            if !ports.is_empty() {
                debug!(server = %live.name, count = ports.len(), "keeping ports outside the view");
                hidden.insert(live.name, ports);
            }
        }
        Self {
            hidden,
            unavailable: None,
        }
    }

    fn keep_hidden_ports(&self, server: &mut A10Server) -> Result<(), String> {
        if let Some(reason) = &self.unavailable {
            return Err(reason.clone());
        }
        for port in self.hidden.get(&server.name).into_iter().flatten() {
            if !server.port_list.contains(port) {
                server.port_list.push(*port);
            }
        }
        Ok(())
    }
}

// ── Model -> wire translation ────────────────────────────────────────

pub(crate) fn server_to_a10(server: &Server) -> A10Server {
    let mut port_list: Vec<A10ServerPort> = Vec::with_capacity(server.ports.len());
    for p in &server.ports {
        let port = A10ServerPort {
            port_num: p.port,
            protocol: p.protocol.code(),
        };
        if !port_list.contains(&port) {
            port_list.push(port);
        }
    }
    A10Server {
        name: server.name.clone(),
        host: server.address.clone(),
        port_list,
    }
}

pub(crate) fn pool_to_a10(pool: &Pool) -> A10ServiceGroup {
    let mut member_list: Vec<A10Member> = Vec::new();
    for server in &pool.members {
        for p in &server.ports {
            let duplicate = member_list
                .iter()
                .any(|m| m.server == server.name && m.port == p.port);
            if !duplicate {
                member_list.push(A10Member {
                    server: server.name.clone(),
                    port: p.port,
                    protocol: Some(p.protocol.code()),
                });
            }
        }
    }
    A10ServiceGroup {
        name: pool.name.clone(),
        protocol: pool.protocol.unwrap_or_default().code(),
        member_list,
    }
}

/// One virtual port per pool; a second pool on an already bound
/// `(port, protocol)` is dropped.
pub(crate) fn virtual_to_a10(vs: &VirtualServer) -> A10VirtualServer {
    let mut vport_list: Vec<A10VirtualPort> = Vec::with_capacity(vs.pools.len());
    for pool in &vs.pools {
        let (port, protocol): (u16, Protocol) = vs.binding_for(pool);
        if let Some(bound) = vport_list
            .iter()
            .find(|v| v.port == port && v.protocol == protocol.code())
        {
            warn!(
                virtual_server = %vs.name,
                port,
                %protocol,
                kept = %bound.service_group,
                dropped = %pool.name,
                "virtual port already bound, dropping pool"
            );
            continue;
        }
        vport_list.push(A10VirtualPort {
            port,
            protocol: protocol.code(),
            service_group: pool.name.clone(),
        });
    }
    A10VirtualServer {
        name: vs.name.clone(),
        address: vs.address.clone(),
        vport_list,
    }
}
