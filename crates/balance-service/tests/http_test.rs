#![allow(clippy::unwrap_used)]
// End-to-end tests: the router served on a local port, talking to a wiremock
// A10 (or F5) appliance.

use balance_core::{AdapterOptions, ApplianceConfig};
use balance_service::{AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AXAPI: &str = "/services/rest/v2.1/";

// ── Helpers ─────────────────────────────────────────────────────────

/// Serve the router on an ephemeral port; returns its base URL.
async fn spawn_service(dry_run: bool) -> String {
    let state = AppState {
        options: AdapterOptions {
            dry_run,
            ..AdapterOptions::default()
        },
        appliance: ApplianceConfig {
            scheme: "http".into(),
            ..ApplianceConfig::default()
        },
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// The mock appliance's `host:port`, as it appears in service paths.
fn node(appliance: &MockServer) -> String {
    appliance.address().to_string()
}

async fn mount_session(appliance: &MockServer) {
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "authenticate"))
        .and(body_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "sess-1" })))
        .mount(appliance)
        .await;

    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "session.close"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": { "status": "OK" } })))
        .mount(appliance)
        .await;
}

/// vs1 (10.1.1.1:80/tcp) -> g1 -> s1 (10.0.0.1:80/tcp).
async fn mount_topology(appliance: &MockServer) {
    Mock::given(method("GET"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.server.getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_list": [{
                "name": "s1",
                "host": "10.0.0.1",
                "port_list": [{ "port_num": 80, "protocol": 2 }]
            }]
        })))
        .mount(appliance)
        .await;

    Mock::given(method("GET"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.service_group.getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_group_list": [{
                "name": "g1",
                "protocol": 2,
                "member_list": [{ "server": "s1", "port": 80 }]
            }]
        })))
        .mount(appliance)
        .await;

    Mock::given(method("GET"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.virtual_server.getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "virtual_server_list": [{
                "name": "vs1",
                "address": "10.1.1.1",
                "vport_list": [{ "port": 80, "protocol": 2, "service_group": "g1" }]
            }]
        })))
        .mount(appliance)
        .await;
}

async fn mount_delete(appliance: &MockServer, object: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", format!("slb.{object}.delete").as_str()))
        .and(body_json(json!({ "name": name })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": { "status": "OK" } })))
        .expect(1)
        .mount(appliance)
        .await;
}

fn expected_view() -> Value {
    json!([{
        "name": "vs1",
        "address": "10.1.1.1",
        "port": 80,
        "protocol": "tcp",
        "pools": [{
            "name": "g1",
            "port": 80,
            "protocol": "tcp",
            "members": [{
                "name": "s1",
                "address": "10.0.0.1",
                "ports": [{ "port": 80, "protocol": "tcp" }]
            }]
        }]
    }])
}

// ── Routing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_root_banner_and_unknown_path() {
    let base = spawn_service(true).await;
    let http = reqwest::Client::new();

    let resp = http.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("nothing to see here"));

    let resp = http.get(format!("{base}/v2/whatever")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_missing_credentials_is_401_with_realm() {
    let base = spawn_service(true).await;

    let resp = reqwest::get(format!("{base}/v1/node/lb1/rule")).await.unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(
        resp.headers()["www-authenticate"].to_str().unwrap(),
        "Basic realm=\"node-lb1\""
    );
}

#[tokio::test]
async fn test_unsupported_method_is_405_with_allow() {
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/v1/node/lb1/rule"))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
    let allow = resp.headers()["allow"].to_str().unwrap().to_owned();
    assert!(allow.contains("GET") && allow.contains("PUT"), "allow: {allow}");
}

#[tokio::test]
async fn test_unimplemented_routes_are_501() {
    let base = spawn_service(true).await;
    let http = reqwest::Client::new();

    for url in [
        format!("{base}/v1/node/lb1/server/"),
        format!("{base}/v1/node/lb1/server"),
    ] {
        let resp = http.get(url).send().await.unwrap();
        assert_eq!(resp.status(), 501);
    }

    let resp = http
        .delete(format!("{base}/v1/f5/node/lb1/rule"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 501);
}

// ── Rule view ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_rule_returns_virtual_view() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/v1/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, expected_view());
}

#[tokio::test]
async fn test_get_rule_yaml_and_debug() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    let base = spawn_service(true).await;
    let http = reqwest::Client::new();

    let resp = http
        .get(format!("{base}/v1/node/{}/rule/", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .header("accept", "application/yaml")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/yaml");
    let body: Value = serde_yaml::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(body, expected_view());

    let resp = http
        .get(format!("{base}/v1/node/{}/rule?debug", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("VirtualServer {"));
}

#[tokio::test]
async fn test_login_failure_is_502() {
    let appliance = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "status": "fail", "err": { "code": 520_486_915, "msg": "Admin password error" } }
        })))
        .mount(&appliance)
        .await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/v1/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("bad"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn test_fetch_failure_is_502() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    Mock::given(method("GET"))
        .and(path(AXAPI))
        .respond_with(ResponseTemplate::new(500))
        .mount(&appliance)
        .await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/v1/node/{}/backend/", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}

// ── Rule reconcile ──────────────────────────────────────────────────

#[tokio::test]
async fn test_put_empty_rules_deletes_everything() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    mount_delete(&appliance, "virtual_server", "vs1").await;
    mount_delete(&appliance, "service_group", "g1").await;
    mount_delete(&appliance, "server", "s1").await;
    let base = spawn_service(false).await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/v1/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .header("content-type", "application/json")
        .body("[]")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-reconcile-errors"], "0");
    // The mock still reports the old topology after the deletes.
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, expected_view());
}

#[tokio::test]
async fn test_put_unchanged_view_keeps_unreferenced_server_ports() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    // s1 also listens on 53/udp, which no service group references
    Mock::given(method("GET"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.server.getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_list": [{
                "name": "s1",
                "host": "10.0.0.1",
                "port_list": [{ "port_num": 80, "protocol": 2 }, { "port_num": 53, "protocol": 3 }]
            }]
        })))
        .with_priority(1)
        .mount(&appliance)
        .await;
    mount_topology(&appliance).await;
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.server.update"))
        .and(body_json(json!({
            "server": {
                "name": "s1",
                "host": "10.0.0.1",
                "port_list": [{ "port_num": 80, "protocol": 2 }, { "port_num": 53, "protocol": 3 }]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": { "status": "OK" } })))
        .expect(1)
        .mount(&appliance)
        .await;
    for update in ["slb.service_group.update", "slb.virtual_server.update"] {
        Mock::given(method("POST"))
            .and(path(AXAPI))
            .and(query_param("method", update))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": { "status": "OK" } })))
            .expect(1)
            .mount(&appliance)
            .await;
    }
    let base = spawn_service(false).await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/v1/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .json(&expected_view())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-reconcile-errors"], "0");
}

#[tokio::test]
async fn test_put_in_dry_run_sends_no_mutations() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.server.delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&appliance)
        .await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/v1/node/{}/rule/", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .header("content-type", "application/yaml")
        .body("[]\n")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-reconcile-errors"], "0");
}

#[tokio::test]
async fn test_put_malformed_body_is_400() {
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/v1/node/lb1/rule"))
        .basic_auth("admin", Some("pw"))
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_put_counts_failed_mutations() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    mount_delete(&appliance, "virtual_server", "vs1").await;
    mount_delete(&appliance, "service_group", "g1").await;
    Mock::given(method("POST"))
        .and(path(AXAPI))
        .and(query_param("method", "slb.server.delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "status": "fail", "err": { "code": 67_174_402, "msg": "in use" } }
        })))
        .mount(&appliance)
        .await;
    let base = spawn_service(false).await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/v1/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .body("[]")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-reconcile-errors"], "1");
}

// ── Backend ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_backend_view() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/v1/node/{}/backend/", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["backend_name"], "s1");
    assert_eq!(body[0]["backend_address"], "10.0.0.1");
    assert_eq!(body[0]["service_groups"][0]["name"], "g1");
    assert_eq!(body[0]["virtual_servers"][0]["name"], "vs1");
}

#[tokio::test]
async fn test_delete_backend_without_groups_deletes_server() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    mount_delete(&appliance, "server", "s1").await;
    let base = spawn_service(false).await;

    let resp = reqwest::Client::new()
        .delete(format!("{base}/v1/node/{}/backend/", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .json(&json!({ "backend_name": "s1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "action": "deleted", "backend": "s1", "errors": 0 }));
}

#[tokio::test]
async fn test_link_backend_missing_name_is_400() {
    let appliance = MockServer::start().await;
    mount_session(&appliance).await;
    mount_topology(&appliance).await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/v1/node/{}/backend", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .json(&json!({ "backend_address": "10.0.0.9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_invalid_backend_is_rejected_before_login() {
    // No authenticate mock: any appliance request would fail with 502.
    let appliance = MockServer::start().await;
    let base = spawn_service(false).await;
    let url = format!("{base}/v1/node/{}/backend", node(&appliance));
    let client = reqwest::Client::new();

    let resp = client
        .post(&url)
        .basic_auth("admin", Some("pw"))
        .json(&json!({ "backend_address": "10.0.0.9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().contains("backend_name"));

    let resp = client
        .post(&url)
        .basic_auth("admin", Some("pw"))
        .json(&json!({ "backend_name": "s9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .delete(&url)
        .basic_auth("admin", Some("pw"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert!(appliance.received_requests().await.unwrap().is_empty());
}

// ── F5 ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_f5_rule_lists_inventory() {
    let appliance = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/virtual"))
        .and(header("authorization", "Basic YWRtaW46cHc="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "name": "web", "partition": "Common", "destination": "/Common/10.1.1.1:80", "pool": "/Common/web_pool" }]
        })))
        .mount(&appliance)
        .await;
    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&appliance)
        .await;
    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&appliance)
        .await;
    let base = spawn_service(true).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/v1/f5/node/{}/rule", node(&appliance)))
        .basic_auth("admin", Some("pw"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["virtual_servers"][0]["name"], "web");
    assert_eq!(body["pools"], json!([]));
}
