// Name extraction and lookups over a virtual view.

use crate::model::{Pool, Server, VirtualServer};

/// Names of every object type referenced by a virtual view, first-seen
/// order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSets {
    pub servers: Vec<String>,
    pub groups: Vec<String>,
    pub virtual_servers: Vec<String>,
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_owned());
    }
}

pub fn list_names(view: &[VirtualServer]) -> NameSets {
    let mut sets = NameSets::default();
    for vs in view {
        push_unique(&mut sets.virtual_servers, &vs.name);
        for pool in &vs.pools {
            push_unique(&mut sets.groups, &pool.name);
            for server in &pool.members {
                push_unique(&mut sets.servers, &server.name);
            }
        }
    }
    sets
}

/// Find a server by name; its ports are merged across every pool it
/// appears in.
pub fn find_server(view: &[VirtualServer], name: &str) -> Option<Server> {
    let mut found: Option<Server> = None;
    let members = view
        .iter()
        .flat_map(|vs| &vs.pools)
        .flat_map(|pool| &pool.members)
        .filter(|s| s.name == name);

    for server in members {
        match found.as_mut() {
            None => found = Some(server.clone()),
            Some(merged) => {
                for port in &server.ports {
                    if !merged.ports.contains(port) {
                        merged.ports.push(*port);
                    }
                }
            }
        }
    }
    found
}

/// Find a pool by name. The first binding wins; its `port`/`protocol` are
/// resolved against the enclosing virtual server.
pub fn find_pool(view: &[VirtualServer], name: &str) -> Option<Pool> {
    view.iter().find_map(|vs| {
        vs.pools.iter().find(|p| p.name == name).map(|pool| {
            let (port, protocol) = vs.binding_for(pool);
            Pool {
                port,
                protocol: Some(protocol),
                ..pool.clone()
            }
        })
    })
}

pub fn find_virtual<'a>(view: &'a [VirtualServer], name: &str) -> Option<&'a VirtualServer> {
    view.iter().find(|vs| vs.name == name)
}
