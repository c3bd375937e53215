// In-memory appliance for unit tests: applies mutations to name-keyed maps,
// records every call, and fails on request.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use balance_api::Error as ApiError;
use balance_api::a10::models::{
    A10Member, A10Server, A10ServerPort, A10ServiceGroup, A10VirtualPort, A10VirtualServer,
};
use indexmap::IndexMap;
use secrecy::SecretString;

use crate::appliance::{Action, Appliance, Mutation, ObjectKind};

#[derive(Default)]
struct State {
    servers: IndexMap<String, A10Server>,
    groups: IndexMap<String, A10ServiceGroup>,
    virtuals: IndexMap<String, A10VirtualServer>,
    calls: Vec<Mutation>,
    failures: HashSet<Mutation>,
    fail_lists: bool,
    logins: usize,
    logouts: usize,
}

#[derive(Default)]
pub struct MemoryAppliance {
    state: Mutex<State>,
}

pub fn server(name: &str, host: &str, ports: &[(u16, u16)]) -> A10Server {
    A10Server {
        name: name.into(),
        host: host.into(),
        port_list: ports
            .iter()
            .map(|&(port_num, protocol)| A10ServerPort { port_num, protocol })
            .collect(),
    }
}

pub fn group(name: &str, members: &[(&str, u16)]) -> A10ServiceGroup {
    A10ServiceGroup {
        name: name.into(),
        protocol: 2,
        member_list: members
            .iter()
            .map(|&(server, port)| A10Member {
                server: server.into(),
                port,
                protocol: None,
            })
            .collect(),
    }
}

pub fn virtual_server(name: &str, address: &str, vports: &[(u16, u16, &str)]) -> A10VirtualServer {
    A10VirtualServer {
        name: name.into(),
        address: address.into(),
        vport_list: vports
            .iter()
            .map(|&(port, protocol, group)| A10VirtualPort {
                port,
                protocol,
                service_group: group.into(),
            })
            .collect(),
    }
}

impl MemoryAppliance {
    pub fn new(
        servers: Vec<A10Server>,
        groups: Vec<A10ServiceGroup>,
        virtuals: Vec<A10VirtualServer>,
    ) -> Self {
        let state = State {
            servers: servers.into_iter().map(|s| (s.name.clone(), s)).collect(),
            groups: groups.into_iter().map(|g| (g.name.clone(), g)).collect(),
            virtuals: virtuals.into_iter().map(|v| (v.name.clone(), v)).collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// `vs1:80/tcp -> g1 -> s1:80/tcp`
    pub fn sample() -> Self {
        Self::new(
            vec![server("s1", "10.0.0.1", &[(80, 2)])],
            vec![group("g1", &[("s1", 80)])],
            vec![virtual_server("vs1", "10.1.1.1", &[(80, 2, "g1")])],
        )
    }

    /// Make one mutation fail with an axAPI error.
    pub fn fail_on(&self, action: Action, object: ObjectKind, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(Mutation::new(action, object, name));
    }

    /// Make every list call fail.
    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    /// Every mutation attempted, in call order.
    pub fn calls(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn sessions(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.logins, state.logouts)
    }

    pub fn group(&self, name: &str) -> Option<A10ServiceGroup> {
        self.state.lock().unwrap().groups.get(name).cloned()
    }

    pub fn server(&self, name: &str) -> Option<A10Server> {
        self.state.lock().unwrap().servers.get(name).cloned()
    }

    pub fn virtual_server(&self, name: &str) -> Option<A10VirtualServer> {
        self.state.lock().unwrap().virtuals.get(name).cloned()
    }

    fn mutate<T>(
        &self,
        action: Action,
        object: ObjectKind,
        name: &str,
        apply: impl FnOnce(&mut State) -> Option<T>,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let mutation = Mutation::new(action, object, name);
        state.calls.push(mutation.clone());
        if state.failures.contains(&mutation) {
            return Err(ApiError::Axapi {
                code: 1,
                message: format!("injected failure: {mutation}"),
            });
        }
        let exists = match object {
            ObjectKind::Server => state.servers.contains_key(name),
            ObjectKind::ServiceGroup => state.groups.contains_key(name),
            ObjectKind::VirtualServer => state.virtuals.contains_key(name),
        };
        let ok = match action {
            Action::Create => !exists,
            Action::Update | Action::Delete => exists,
        };
        if !ok {
            return Err(ApiError::Axapi {
                code: 2,
                message: format!("cannot {mutation}"),
            });
        }
        apply(&mut *state);
        Ok(())
    }

    fn list<T: Clone>(&self, pick: impl FnOnce(&State) -> Vec<T>) -> Result<Vec<T>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(ApiError::AxapiHttp {
                status: 500,
                message: "list failed".into(),
            });
        }
        Ok(pick(&state))
    }
}

#[async_trait]
impl Appliance for MemoryAppliance {
    async fn login(&self, _username: &str, _password: &SecretString) -> Result<(), ApiError> {
        self.state.lock().unwrap().logins += 1;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.state.lock().unwrap().logouts += 1;
        Ok(())
    }

    async fn list_servers(&self) -> Result<Vec<A10Server>, ApiError> {
        self.list(|s| s.servers.values().cloned().collect())
    }

    async fn create_server(&self, server: &A10Server) -> Result<(), ApiError> {
        self.mutate(Action::Create, ObjectKind::Server, &server.name, |s| {
            s.servers.insert(server.name.clone(), server.clone())
        })
    }

    async fn update_server(&self, server: &A10Server) -> Result<(), ApiError> {
        self.mutate(Action::Update, ObjectKind::Server, &server.name, |s| {
            s.servers.insert(server.name.clone(), server.clone())
        })
    }

    async fn delete_server(&self, name: &str) -> Result<(), ApiError> {
        self.mutate(Action::Delete, ObjectKind::Server, name, |s| {
            s.servers.shift_remove(name)
        })
    }

    async fn list_service_groups(&self) -> Result<Vec<A10ServiceGroup>, ApiError> {
        self.list(|s| s.groups.values().cloned().collect())
    }

    async fn create_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        self.mutate(Action::Create, ObjectKind::ServiceGroup, &group.name, |s| {
            s.groups.insert(group.name.clone(), group.clone())
        })
    }

    async fn update_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        self.mutate(Action::Update, ObjectKind::ServiceGroup, &group.name, |s| {
            s.groups.insert(group.name.clone(), group.clone())
        })
    }

    async fn delete_service_group(&self, name: &str) -> Result<(), ApiError> {
        self.mutate(Action::Delete, ObjectKind::ServiceGroup, name, |s| {
            s.groups.shift_remove(name)
        })
    }

    async fn list_virtual_servers(&self) -> Result<Vec<A10VirtualServer>, ApiError> {
        self.list(|s| s.virtuals.values().cloned().collect())
    }

    async fn create_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        self.mutate(Action::Create, ObjectKind::VirtualServer, &vs.name, |s| {
            s.virtuals.insert(vs.name.clone(), vs.clone())
        })
    }

    async fn update_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        self.mutate(Action::Update, ObjectKind::VirtualServer, &vs.name, |s| {
            s.virtuals.insert(vs.name.clone(), vs.clone())
        })
    }

    async fn delete_virtual_server(&self, name: &str) -> Result<(), ApiError> {
        self.mutate(Action::Delete, ObjectKind::VirtualServer, name, |s| {
            s.virtuals.shift_remove(name)
        })
    }
}
