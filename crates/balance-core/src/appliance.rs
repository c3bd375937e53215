// ── Appliance capability ──
//
// The object-graph operations the engine needs from an appliance session.
// `A10Client` implements it directly; `DryRun` wraps any implementation and
// swallows mutations.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use balance_api::A10Client;
use balance_api::Error as ApiError;
use balance_api::a10::models::{A10Server, A10ServiceGroup, A10VirtualServer};
use secrecy::SecretString;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::info;

/// Session-scoped appliance operations over servers, service groups and
/// virtual servers.
#[async_trait]
pub trait Appliance: Send + Sync {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;

    async fn list_servers(&self) -> Result<Vec<A10Server>, ApiError>;
    async fn create_server(&self, server: &A10Server) -> Result<(), ApiError>;
    async fn update_server(&self, server: &A10Server) -> Result<(), ApiError>;
    async fn delete_server(&self, name: &str) -> Result<(), ApiError>;

    async fn list_service_groups(&self) -> Result<Vec<A10ServiceGroup>, ApiError>;
    async fn create_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError>;
    async fn update_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError>;
    async fn delete_service_group(&self, name: &str) -> Result<(), ApiError>;

    async fn list_virtual_servers(&self) -> Result<Vec<A10VirtualServer>, ApiError>;
    async fn create_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError>;
    async fn update_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError>;
    async fn delete_virtual_server(&self, name: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl Appliance for A10Client {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        A10Client::login(self, username, password).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        A10Client::logout(self).await
    }

    async fn list_servers(&self) -> Result<Vec<A10Server>, ApiError> {
        A10Client::list_servers(self).await
    }

    async fn create_server(&self, server: &A10Server) -> Result<(), ApiError> {
        A10Client::create_server(self, server).await
    }

    async fn update_server(&self, server: &A10Server) -> Result<(), ApiError> {
        A10Client::update_server(self, server).await
    }

    async fn delete_server(&self, name: &str) -> Result<(), ApiError> {
        A10Client::delete_server(self, name).await
    }

    async fn list_service_groups(&self) -> Result<Vec<A10ServiceGroup>, ApiError> {
        A10Client::list_service_groups(self).await
    }

    async fn create_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        A10Client::create_service_group(self, group).await
    }

    async fn update_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        A10Client::update_service_group(self, group).await
    }

    async fn delete_service_group(&self, name: &str) -> Result<(), ApiError> {
        A10Client::delete_service_group(self, name).await
    }

    async fn list_virtual_servers(&self) -> Result<Vec<A10VirtualServer>, ApiError> {
        A10Client::list_virtual_servers(self).await
    }

    async fn create_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        A10Client::create_virtual_server(self, vs).await
    }

    async fn update_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        A10Client::update_virtual_server(self, vs).await
    }

    async fn delete_virtual_server(&self, name: &str) -> Result<(), ApiError> {
        A10Client::delete_virtual_server(self, name).await
    }
}

// ── Mutation records ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Server,
    ServiceGroup,
    VirtualServer,
}

/// One appliance mutation: `(action, object kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Mutation {
    pub action: Action,
    pub object: ObjectKind,
    pub name: String,
}

impl Mutation {
    pub fn new(action: Action, object: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            action,
            object,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.action, self.object, self.name)
    }
}

// ── Dry run ──────────────────────────────────────────────────────────

/// Forwards reads and session calls to the wrapped appliance; logs and
/// records mutations without sending them.
pub struct DryRun<A> {
    inner: A,
    recorded: Mutex<Vec<Mutation>>,
}

impl<A: Appliance> DryRun<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Mutations swallowed so far, in call order.
    pub fn recorded(&self) -> Vec<Mutation> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, mutation: Mutation) {
        info!(%mutation, "dry run: mutation not sent");
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mutation);
    }
}

#[async_trait]
impl<A: Appliance> Appliance for DryRun<A> {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        self.inner.login(username, password).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.inner.logout().await
    }

    async fn list_servers(&self) -> Result<Vec<A10Server>, ApiError> {
        self.inner.list_servers().await
    }

    async fn create_server(&self, server: &A10Server) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Create, ObjectKind::Server, &server.name));
        Ok(())
    }

    async fn update_server(&self, server: &A10Server) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Update, ObjectKind::Server, &server.name));
        Ok(())
    }

    async fn delete_server(&self, name: &str) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Delete, ObjectKind::Server, name));
        Ok(())
    }

    async fn list_service_groups(&self) -> Result<Vec<A10ServiceGroup>, ApiError> {
        self.inner.list_service_groups().await
    }

    async fn create_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Create, ObjectKind::ServiceGroup, &group.name));
        Ok(())
    }

    async fn update_service_group(&self, group: &A10ServiceGroup) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Update, ObjectKind::ServiceGroup, &group.name));
        Ok(())
    }

    async fn delete_service_group(&self, name: &str) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Delete, ObjectKind::ServiceGroup, name));
        Ok(())
    }

    async fn list_virtual_servers(&self) -> Result<Vec<A10VirtualServer>, ApiError> {
        self.inner.list_virtual_servers().await
    }

    async fn create_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Create, ObjectKind::VirtualServer, &vs.name));
        Ok(())
    }

    async fn update_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Update, ObjectKind::VirtualServer, &vs.name));
        Ok(())
    }

    async fn delete_virtual_server(&self, name: &str) -> Result<(), ApiError> {
        self.record(Mutation::new(Action::Delete, ObjectKind::VirtualServer, name));
        Ok(())
    }
}
