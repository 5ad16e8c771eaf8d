//! Shared fixtures: a "DEMO" project with versions "Release-1" and "2.0".

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use zapi_client::fakes::{Method, ScriptedTransport};
use zapi_client::ZapiClient;

pub const PROJECT_ID: &str = "10000";
pub const RELEASE_1_ID: &str = "10100";
pub const V2_ID: &str = "10200";

pub const PROJECT_PATH: &str = "rest/api/2/project/DEMO";
pub const VERSIONS_PATH: &str = "rest/zapi/latest/util/versionBoard-list?projectId=10000";
pub const V2_CYCLES_PATH: &str = "rest/zapi/latest/cycle?projectId=10000&versionId=10200";
pub const CREATE_CYCLE_PATH: &str = "rest/zapi/latest/cycle/";

/// Project and version lookups for DEMO
pub fn demo_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .on_json(
            Method::Get,
            PROJECT_PATH,
            json!({"id": PROJECT_ID, "key": "DEMO", "name": "Demo project"}),
        )
        .on_json(
            Method::Get,
            VERSIONS_PATH,
            json!({
                "unreleasedVersions": [
                    {"label": "Release-1", "value": RELEASE_1_ID, "archived": false},
                    {"label": "2.0", "value": 10200, "archived": false}
                ],
                "releasedVersions": [
                    {"label": "1.0", "value": "10050", "archived": false}
                ]
            }),
        )
}

/// Cycle listing for version 2.0 containing an ad hoc cycle and "Regression"
pub fn v2_cycles_without_smoke() -> serde_json::Value {
    json!({
        "-1": {"name": "Ad hoc", "versionId": 10200},
        "31": {"name": "Regression", "versionId": 10200},
        "recordsCount": 2
    })
}

pub fn v2_cycles_with_smoke(smoke_id: &str) -> serde_json::Value {
    let mut cycles = v2_cycles_without_smoke();
    cycles[smoke_id] = json!({"name": "Smoke", "versionId": 10200});
    cycles["recordsCount"] = json!(3);
    cycles
}

/// Client over `transport` with the DEMO project already resolved
pub async fn demo_client(transport: ScriptedTransport) -> (ZapiClient<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
    let fake = Arc::new(transport);
    let mut client = ZapiClient::new(fake.clone());
    client
        .resolve_project("DEMO")
        .await
        .expect("project lookup failed");
    (client, fake)
}
