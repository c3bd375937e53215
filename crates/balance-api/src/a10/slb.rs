// A10 SLB object endpoints
//
// Servers, service groups and virtual servers. Lists are GETs of
// `slb.<object>.getAll`; mutations POST the object wrapped in its type key,
// deletes POST `{"name": ...}`.

use serde_json::json;
use tracing::debug;

use crate::a10::client::A10Client;
use crate::a10::models::{
    A10Server, A10ServiceGroup, A10VirtualServer, ServerList, ServiceGroupList, VirtualServerList,
};
use crate::error::Error;

impl A10Client {
    // ── Servers ──────────────────────────────────────────────────────

    /// `slb.server.getAll`
    pub async fn list_servers(&self) -> Result<Vec<A10Server>, Error> {
        let list: ServerList = self.get("slb.server.getAll").await?;
        debug!(count = list.server_list.len(), "listed servers");
        Ok(list.server_list)
    }

    /// `slb.server.create`
    pub async fn create_server(&self, server: &A10Server) -> Result<(), Error> {
        debug!(name = %server.name, host = %server.host, "creating server");
        self.post("slb.server.create", &json!({ "server": server }))
            .await
    }

    /// `slb.server.update`
    pub async fn update_server(&self, server: &A10Server) -> Result<(), Error> {
        debug!(name = %server.name, host = %server.host, "updating server");
        self.post("slb.server.update", &json!({ "server": server }))
            .await
    }

    /// `slb.server.delete`
    pub async fn delete_server(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting server");
        self.post("slb.server.delete", &json!({ "name": name })).await
    }

    // ── Service groups ───────────────────────────────────────────────

    /// `slb.service_group.getAll`
    pub async fn list_service_groups(&self) -> Result<Vec<A10ServiceGroup>, Error> {
        let list: ServiceGroupList = self.get("slb.service_group.getAll").await?;
        debug!(
            count = list.service_group_list.len(),
            "listed service groups"
        );
        Ok(list.service_group_list)
    }

    /// `slb.service_group.create`
    pub async fn create_service_group(&self, group: &A10ServiceGroup) -> Result<(), Error> {
        debug!(name = %group.name, members = group.member_list.len(), "creating service group");
        self.post("slb.service_group.create", &json!({ "service_group": group }))
            .await
    }

    /// `slb.service_group.update`
    pub async fn update_service_group(&self, group: &A10ServiceGroup) -> Result<(), Error> {
        debug!(name = %group.name, members = group.member_list.len(), "updating service group");
        self.post("slb.service_group.update", &json!({ "service_group": group }))
            .await
    }

    /// `slb.service_group.delete`
    pub async fn delete_service_group(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting service group");
        self.post("slb.service_group.delete", &json!({ "name": name }))
            .await
    }

    // ── Virtual servers ──────────────────────────────────────────────

    /// `slb.virtual_server.getAll`
    pub async fn list_virtual_servers(&self) -> Result<Vec<A10VirtualServer>, Error> {
        let list: VirtualServerList = self.get("slb.virtual_server.getAll").await?;
        debug!(
            count = list.virtual_server_list.len(),
            "listed virtual servers"
        );
        Ok(list.virtual_server_list)
    }

    /// `slb.virtual_server.create`
    pub async fn create_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), Error> {
        debug!(name = %vs.name, address = %vs.address, "creating virtual server");
        self.post("slb.virtual_server.create", &json!({ "virtual_server": vs }))
            .await
    }

    /// `slb.virtual_server.update`
    pub async fn update_virtual_server(&self, vs: &A10VirtualServer) -> Result<(), Error> {
        debug!(name = %vs.name, address = %vs.address, "updating virtual server");
        self.post("slb.virtual_server.update", &json!({ "virtual_server": vs }))
            .await
    }

    /// `slb.virtual_server.delete`
    pub async fn delete_virtual_server(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting virtual server");
        self.post("slb.virtual_server.delete", &json!({ "name": name }))
            .await
    }
}
