// ── Backend link / unlink ──
//
// Single-server flows behind the backend route: create or update one
// server and splice it into named service groups, or pull it back out
// (deleting the server when no groups are named).

use balance_api::a10::models::{A10Member, A10Server, A10ServerPort, A10ServiceGroup};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::appliance::Appliance;
use crate::error::CoreError;
use crate::model::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BackendAction {
    Created,
    Updated,
    Linked,
    Deleted,
    Unlinked,
}

/// What a backend request did. `errors` counts failed group updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendChange {
    pub action: BackendAction,
    pub backend: String,
    pub errors: usize,
}

/// Members of `group` that do not belong to the backend, followed by the
/// members the caller supplied for this group.
pub fn rebuild_member_list(group: &A10ServiceGroup, backend: &Backend) -> Vec<A10Member> {
    let mut members: Vec<A10Member> = group
        .member_list
        .iter()
        .filter(|m| m.server != backend.backend_name)
        .cloned()
        .collect();

    let requested = backend
        .service_groups
        .iter()
        .filter(|g| g.name == group.name)
        .flat_map(|g| &g.members);

    for m in requested {
        let server = if m.name.is_empty() {
            backend.backend_name.clone()
        } else {
            m.name.clone()
        };
        let protocol = (server == backend.backend_name)
            .then(|| {
                backend
                    .backend_ports
                    .iter()
                    .find(|p| p.port == m.port)
                    .map(|p| p.protocol.code())
            })
            .flatten();
        if members.iter().any(|e| e.server == server && e.port == m.port) {
            continue;
        }
        members.push(A10Member {
            server,
            port: m.port,
            protocol,
        });
    }

    debug!(group = %group.name, members = members.len(), "rebuilt member list");
    members
}

/// Resolve every service group named by `backend`; a missing one is fatal.
async fn resolve_groups<A: Appliance + ?Sized>(
    appliance: &A,
    backend: &Backend,
) -> Result<Vec<A10ServiceGroup>, CoreError> {
    let all = appliance
        .list_service_groups()
        .await
        .map_err(|e| CoreError::gateway("list service groups", &e))?;

    backend
        .service_groups
        .iter()
        .map(|wanted| {
            all.iter()
                .find(|g| g.name == wanted.name)
                .cloned()
                .ok_or_else(|| {
                    warn!(backend = %backend.backend_name, group = %wanted.name, "service group not found");
                    CoreError::ServiceGroupNotFound {
                        name: wanted.name.clone(),
                    }
                })
        })
        .collect()
}

/// Push `member_list` to `group`, counting a failure instead of returning it.
async fn push_members<A: Appliance + ?Sized>(
    appliance: &A,
    group: &A10ServiceGroup,
    member_list: Vec<A10Member>,
    step: &str,
) -> usize {
    let update = A10ServiceGroup {
        name: group.name.clone(),
        protocol: group.protocol,
        member_list,
    };
    match appliance.update_service_group(&update).await {
        Ok(()) => 0,
        Err(e) => {
            warn!(group = %group.name, step, error = %e, "service group update failed");
            1
        }
    }
}

/// Field checks for a link request; needs no appliance session.
pub fn validate_link(backend: &Backend) -> Result<(), CoreError> {
    validate_unlink(backend)?;
    if backend.backend_address.is_empty() {
        return Err(CoreError::missing("backend_address"));
    }
    Ok(())
}

/// Field checks for an unlink request.
pub fn validate_unlink(backend: &Backend) -> Result<(), CoreError> {
    if backend.backend_name.is_empty() {
        return Err(CoreError::missing("backend_name"));
    }
    Ok(())
}

/// Create or update the backend server, then link it into every named
/// service group.
pub async fn link_backend<A: Appliance + ?Sized>(
    appliance: &A,
    backend: &Backend,
) -> Result<BackendChange, CoreError> {
    validate_link(backend)?;

    let groups = resolve_groups(appliance, backend).await?;

    let exists = appliance
        .list_servers()
        .await
        .map_err(|e| CoreError::gateway("list servers", &e))?
        .iter()
        .any(|s| s.name == backend.backend_name);

    let server = A10Server {
        name: backend.backend_name.clone(),
        host: backend.backend_address.clone(),
        port_list: backend
            .port_codes()
            .into_iter()
            .map(|(port_num, protocol)| A10ServerPort { port_num, protocol })
            .collect(),
    };
    if exists {
        appliance
            .update_server(&server)
            .await
            .map_err(|e| CoreError::gateway("update server", &e))?;
    } else {
        appliance
            .create_server(&server)
            .await
            .map_err(|e| CoreError::gateway("create server", &e))?;
    }

    if groups.is_empty() {
        let action = if exists {
            BackendAction::Updated
        } else {
            BackendAction::Created
        };
        info!(backend = %backend.backend_name, %action, "backend server saved");
        return Ok(BackendChange {
            action,
            backend: backend.backend_name.clone(),
            errors: 0,
        });
    }

    let mut errors = 0;
    for group in &groups {
        let members = rebuild_member_list(group, backend);
        errors += push_members(appliance, group, members, "link").await;
    }

    info!(backend = %backend.backend_name, groups = groups.len(), errors, "backend linked");
    Ok(BackendChange {
        action: BackendAction::Linked,
        backend: backend.backend_name.clone(),
        errors,
    })
}

/// Delete the backend server, or unlink it from the named service groups
/// (reset each group, then push the rebuilt member list).
pub async fn unlink_backend<A: Appliance + ?Sized>(
    appliance: &A,
    backend: &Backend,
) -> Result<BackendChange, CoreError> {
    validate_unlink(backend)?;

    if backend.service_groups.is_empty() {
        appliance
            .delete_server(&backend.backend_name)
            .await
            .map_err(|e| CoreError::gateway("delete server", &e))?;
        info!(backend = %backend.backend_name, "backend server deleted");
        return Ok(BackendChange {
            action: BackendAction::Deleted,
            backend: backend.backend_name.clone(),
            errors: 0,
        });
    }

    let groups = resolve_groups(appliance, backend).await?;

    let mut errors = 0;
    for group in &groups {
        errors += push_members(appliance, group, Vec::new(), "reset").await;
        let members = rebuild_member_list(group, backend);
        errors += push_members(appliance, group, members, "rebuild").await;
    }

    info!(backend = %backend.backend_name, groups = groups.len(), errors, "backend unlinked");
    Ok(BackendChange {
        action: BackendAction::Unlinked,
        backend: backend.backend_name.clone(),
        errors,
    })
}
