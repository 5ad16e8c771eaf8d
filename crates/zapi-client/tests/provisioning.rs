//! Cycle get-or-create behaviour.

mod common;

use common::*;
use serde_json::json;
use zapi_client::fakes::Method;
use zapi_client::{CycleId, RawResponse, VersionId, ZapiError};

/// End-to-end: DEMO / 2.0 has no "Smoke" cycle, so provisioning resolves the
/// version, misses the cycle, then creates it.
#[tokio::test]
async fn smoke_cycle_is_created_in_version() {
    let transport = demo_transport()
        .on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_without_smoke())
        .on_json(
            Method::Post,
            CREATE_CYCLE_PATH,
            json!({"id": "42", "responseMessage": "Cycle 42 created successfully."}),
        );
    let (mut client, fake) = demo_client(transport).await;

    let id = client
        .get_or_create_cycle_in_version("Smoke", "2.0")
        .await
        .unwrap();

    assert_eq!(id, CycleId::from("42"));
    assert_eq!(client.session().version_id(), Some(&VersionId::from(V2_ID)));
    assert_eq!(client.session().cycle_id(), Some(&id));

    // project, versions, cycles, create
    let calls = fake.calls();
    let sequence: Vec<(Method, &str)> = calls.iter().map(|c| (c.method, c.path.as_str())).collect();
    assert_eq!(
        sequence,
        vec![
            (Method::Get, PROJECT_PATH),
            (Method::Get, VERSIONS_PATH),
            (Method::Get, V2_CYCLES_PATH),
            (Method::Post, CREATE_CYCLE_PATH),
        ]
    );

    let payload = calls[3].payload.as_ref().unwrap();
    assert_eq!(
        payload,
        &json!({"name": "Smoke", "projectId": PROJECT_ID, "versionId": V2_ID})
    );
}

#[tokio::test]
async fn existing_cycle_is_not_recreated() {
    let transport = demo_transport().on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_with_smoke("17"));
    let (mut client, fake) = demo_client(transport).await;

    let id = client
        .get_or_create_cycle_in_version("smoke", "2.0")
        .await
        .unwrap();

    assert_eq!(id, CycleId::from("17"));
    assert_eq!(fake.count(Method::Post, CREATE_CYCLE_PATH), 0);
}

#[tokio::test]
async fn repeated_provisioning_creates_exactly_once() {
    // Before creation the listing lacks Smoke; afterwards the server lists it.
    let transport = demo_transport()
        .on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_without_smoke())
        .on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_with_smoke("42"))
        .on_json(Method::Post, CREATE_CYCLE_PATH, json!({"id": 42}));
    let (mut client, fake) = demo_client(transport).await;
    client.resolve_version("2.0").await.unwrap();

    let first = client.get_or_create_cycle("Smoke").await.unwrap();
    let second = client.get_or_create_cycle("Smoke").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, CycleId::from("42"));
    assert_eq!(fake.count(Method::Post, CREATE_CYCLE_PATH), 1);
    assert_eq!(fake.count(Method::Get, V2_CYCLES_PATH), 2);
}

#[tokio::test]
async fn lookup_transport_failure_does_not_create() {
    let transport = demo_transport().on(
        Method::Get,
        V2_CYCLES_PATH,
        RawResponse::new(401, r#"{"errorMessages":["Unauthorized"]}"#),
    );
    let (mut client, fake) = demo_client(transport).await;

    let err = client
        .get_or_create_cycle_in_version("Smoke", "2.0")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapiError::Transport { status: 401, .. }));
    assert_eq!(fake.count(Method::Post, CREATE_CYCLE_PATH), 0);
}

#[tokio::test]
async fn lookup_decode_failure_does_not_create() {
    let transport = demo_transport().on(Method::Get, V2_CYCLES_PATH, RawResponse::new(200, "<html/>"));
    let (mut client, fake) = demo_client(transport).await;

    let err = client
        .get_or_create_cycle_in_version("Smoke", "2.0")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapiError::Decode(_)));
    assert_eq!(fake.count(Method::Post, CREATE_CYCLE_PATH), 0);
}

#[tokio::test]
async fn unknown_version_stops_provisioning() {
    let (mut client, fake) = demo_client(demo_transport()).await;

    let err = client
        .get_or_create_cycle_in_version("Smoke", "7.0")
        .await
        .unwrap_err();

    // NotFound for the version is not swallowed by the provisioner
    assert!(err.is_not_found());
    assert_eq!(fake.count(Method::Get, "rest/zapi/latest/cycle"), 0);
    assert_eq!(fake.count(Method::Post, CREATE_CYCLE_PATH), 0);
}

#[tokio::test]
async fn create_failure_propagates() {
    let transport = demo_transport()
        .on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_without_smoke())
        .on(
            Method::Post,
            CREATE_CYCLE_PATH,
            RawResponse::new(400, r#"{"error":"Cycle name is required"}"#),
        );
    let (mut client, _fake) = demo_client(transport).await;

    let err = client
        .get_or_create_cycle_in_version("Smoke", "2.0")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapiError::Transport { status: 400, .. }));
    assert!(client.session().cycle_id().is_none());
}

#[tokio::test]
async fn create_response_without_id_is_decode_error() {
    let transport = demo_transport()
        .on_json(Method::Get, V2_CYCLES_PATH, v2_cycles_without_smoke())
        .on_json(Method::Post, CREATE_CYCLE_PATH, json!({"responseMessage": "ok"}));
    let (mut client, _fake) = demo_client(transport).await;

    let err = client
        .get_or_create_cycle_in_version("Smoke", "2.0")
        .await
        .unwrap_err();

    assert!(matches!(err, ZapiError::Decode(_)));
}
