// Virtual and backend projections of an `Inventory`.

use balance_api::a10::models::A10ServiceGroup;
use indexmap::IndexMap;
use tracing::warn;

use super::Inventory;
use crate::model::{
    Backend, BackendMember, BackendPort, BackendServiceGroup, BackendVirtualPort,
    BackendVirtualServer, Pool, Protocol, Server, ServerPort, VirtualServer,
};

impl Inventory {
    /// `VirtualServer -> Pool -> Server` view in appliance order.
    ///
    /// One pool entry per distinct `(port, protocol, group)` virtual port.
    pub fn virtual_view(&self) -> Vec<VirtualServer> {
        let mut view = Vec::with_capacity(self.virtual_servers.len());

        for vs in self.virtual_servers.values() {
            let (port, protocol) = vs
                .vport_list
                .first()
                .map_or((0, Protocol::Tcp), |vp| (vp.port, Protocol::from_code(vp.protocol)));

            let mut pools: Vec<Pool> = Vec::new();
            for vp in &vs.vport_list {
                let Some(group) = self.groups.get(&vp.service_group) else {
                    warn!(
                        virtual_server = %vs.name,
                        group = %vp.service_group,
                        "virtual port references unknown service group"
                    );
                    continue;
                };
                let protocol = Protocol::from_code(vp.protocol);
                let seen = pools.iter().any(|p| {
                    p.name == group.name && p.port == vp.port && p.protocol == Some(protocol)
                });
                if seen {
                    continue;
                }
                pools.push(Pool {
                    name: group.name.clone(),
                    port: vp.port,
                    protocol: Some(protocol),
                    members: self.pool_members(group),
                });
            }

            view.push(VirtualServer {
                name: vs.name.clone(),
                address: vs.address.clone(),
                port,
                protocol,
                pools,
            });
        }

        view
    }

    /// Member servers of `group`, carrying only the referenced ports.
    /// A repeated `(server, port)` member is attached once.
    pub(crate) fn pool_members(&self, group: &A10ServiceGroup) -> Vec<Server> {
        let mut members: Vec<Server> = Vec::new();

        for m in &group.member_list {
            let Some(server) = self.servers.get(&m.server) else {
                warn!(group = %group.name, server = %m.server, "member references unknown server");
                continue;
            };
            let code = server
                .port_list
                .iter()
                .find(|p| p.port_num == m.port)
                .map(|p| p.protocol)
                .or(m.protocol)
                .unwrap_or(group.protocol);
            let port = ServerPort {
                port: m.port,
                protocol: Protocol::from_code(code),
            };

            match members.iter_mut().find(|s| s.name == server.name) {
                Some(existing) => {
                    if !existing.ports.iter().any(|p| p.port == port.port) {
                        existing.ports.push(port);
                    }
                }
                None => members.push(Server {
                    name: server.name.clone(),
                    address: server.host.clone(),
                    ports: vec![port],
                }),
            }
        }

        members
    }

    /// Server-centric view: every server with the groups that reference it
    /// and the virtual servers bound to those groups.
    pub fn backend_view(&self) -> Vec<Backend> {
        let mut backends: IndexMap<&str, Backend> = self
            .servers
            .values()
            .map(|s| {
                let backend = Backend {
                    backend_name: s.name.clone(),
                    backend_address: s.host.clone(),
                    backend_ports: s
                        .port_list
                        .iter()
                        .map(|p| BackendPort {
                            port: p.port_num,
                            protocol: Protocol::from_code(p.protocol),
                        })
                        .collect(),
                    ..Backend::default()
                };
                (s.name.as_str(), backend)
            })
            .collect();

        // group -> member servers
        for group in self.groups.values() {
            for m in &group.member_list {
                let Some(backend) = backends.get_mut(m.server.as_str()) else {
                    warn!(group = %group.name, server = %m.server, "member references unknown server");
                    continue;
                };
                let member = BackendMember {
                    name: m.server.clone(),
                    port: m.port,
                };
                match backend.service_groups.iter_mut().find(|g| g.name == group.name) {
                    Some(existing) => {
                        if !existing.members.contains(&member) {
                            existing.members.push(member);
                        }
                    }
                    None => backend.service_groups.push(BackendServiceGroup {
                        name: group.name.clone(),
                        protocol: Protocol::from_code(group.protocol),
                        members: vec![member],
                    }),
                }
            }
        }

        // virtual server -> group -> member servers
        for vs in self.virtual_servers.values() {
            for vp in &vs.vport_list {
                let Some(group) = self.groups.get(&vp.service_group) else {
                    warn!(
                        virtual_server = %vs.name,
                        group = %vp.service_group,
                        "virtual port references unknown service group"
                    );
                    continue;
                };
                let vport = BackendVirtualPort {
                    port: vp.port,
                    protocol: Protocol::from_code(vp.protocol),
                    service_group: group.name.clone(),
                };
                for m in &group.member_list {
                    let Some(backend) = backends.get_mut(m.server.as_str()) else {
                        continue;
                    };
                    attach_virtual(backend, &vs.name, &vs.address, &vport);
                }
            }
        }

        backends.into_values().collect()
    }
}

fn attach_virtual(backend: &mut Backend, name: &str, address: &str, vport: &BackendVirtualPort) {
    match backend.virtual_servers.iter_mut().find(|v| v.name == name) {
        Some(existing) => {
            if !existing.virtual_ports.contains(vport) {
                existing.virtual_ports.push(vport.clone());
            }
        }
        None => backend.virtual_servers.push(BackendVirtualServer {
            name: name.to_owned(),
            address: address.to_owned(),
            virtual_ports: vec![vport.clone()],
        }),
    }
}
