//! End-to-end tests of the HTTP transport and both backends against a mock server

use std::sync::Arc;
use std::time::Duration;

use alertpolicy::config::ApiConfig;
use alertpolicy::prelude::*;
use alertpolicy::transport::TransportError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "NRAK-TEST";
const ACCOUNT_ID: i64 = 2_520_528;

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        rest_url: format!("{}/v2", server.uri()),
        nerdgraph_url: format!("{}/graphql", server.uri()),
        api_key: API_KEY.to_string(),
        account_id: Some(ACCOUNT_ID),
        timeout: Duration::from_secs(5),
    }
}

fn policies(server: &MockServer, routing: BackendRouting) -> Policies {
    let config = Config {
        api: api_config(server),
        routing,
        ..Config::default()
    };
    Policies::from_config(&config).expect("valid config")
}

#[tokio::test]
async fn rest_list_follows_link_headers() {
    let server = MockServer::start().await;
    let next = format!("{}/v2/alerts_policies.json?page=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/v2/alerts_policies.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policies": [{"id": 3, "name": "cpu-3", "incident_preference": "PER_POLICY"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts_policies.json"))
        .and(query_param("filter[name]", "cpu"))
        .and(header("Api-Key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_json(json!({
                    "policies": [
                        {"id": 1, "name": "cpu-1", "incident_preference": "PER_POLICY"},
                        {"id": 2, "name": "cpu-2", "incident_preference": "PER_CONDITION"}
                    ]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let found = policies(&server, BackendRouting::default())
        .list(ACCOUNT_ID, &ListPoliciesParams::by_name("cpu"))
        .await
        .unwrap();

    let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["cpu-1", "cpu-2", "cpu-3"]);
}

#[tokio::test]
async fn rest_delete_twice_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/alerts_policies/7.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policy": {"id": 7, "name": "disk-full", "incident_preference": "PER_CONDITION"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v2/alerts_policies/7.json"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": {"title": "Not found"}})),
        )
        .mount(&server)
        .await;

    let policies = policies(&server, BackendRouting::default());

    let deleted = policies.delete(ACCOUNT_ID, 7).await.unwrap();
    assert_eq!(deleted.id, 7);
    assert_eq!(
        deleted.policy.map(|p| p.incident_preference),
        Some(IncidentPreference::PerCondition)
    );

    let err = policies.delete(ACCOUNT_ID, 7).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn rest_create_posts_wrapped_policy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/alerts_policies.json"))
        .and(body_partial_json(json!({
            "policy": {"name": "cpu-high", "incident_preference": "PER_CONDITION"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "policy": {
                "id": 101,
                "name": "cpu-high",
                "incident_preference": "PER_CONDITION",
                "created_at": 1_600_000_000_000_i64,
                "updated_at": 1_600_000_000_000_i64
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = policies(&server, BackendRouting::default())
        .create(
            ACCOUNT_ID,
            Policy::new("cpu-high", IncidentPreference::PerCondition),
        )
        .await
        .unwrap();

    assert_eq!(created.id, Some(101));
    assert_eq!(created.created_at.map(|t| t.timestamp()), Some(1_600_000_000));
}

#[tokio::test]
async fn rest_server_error_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts_policies.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = policies(&server, BackendRouting::default())
        .get(ACCOUNT_ID, 1)
        .await
        .unwrap_err();

    match err {
        Error::Transport {
            operation,
            source: TransportError::Status { status, body },
            ..
        } => {
            assert_eq!(operation, "list");
            assert_eq!(status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn nerdgraph_create_and_get() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Api-Key", API_KEY))
        .and(body_partial_json(json!({
            "variables": {
                "accountID": ACCOUNT_ID,
                "policy": {"name": "cpu-high", "incidentPreference": "PER_CONDITION"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"alertsPolicyCreate": {
                "id": "31337", "name": "cpu-high", "incidentPreference": "PER_CONDITION"
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": {"accountID": ACCOUNT_ID, "policyID": "31337"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"actor": {"account": {"alerts": {"policy": {
                "id": "31337", "name": "cpu-high", "incidentPreference": "PER_CONDITION"
            }}}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let policies = policies(&server, BackendRouting::uniform(BackendKind::NerdGraph));

    let created = policies
        .create(
            ACCOUNT_ID,
            Policy::new("cpu-high", IncidentPreference::PerCondition),
        )
        .await
        .unwrap();
    let fetched = policies.get(ACCOUNT_ID, created.id.unwrap()).await.unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.id, Some(31_337));
}

#[tokio::test]
async fn nerdgraph_errors_fail_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"alertsPolicyDelete": null},
            "errors": [{
                "message": "Not Found",
                "extensions": {"errorClass": "NOT_FOUND"}
            }]
        })))
        .mount(&server)
        .await;

    let err = policies(&server, BackendRouting::uniform(BackendKind::NerdGraph))
        .delete(ACCOUNT_ID, 404)
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn transport_passes_absolute_urls_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&api_config(&server)).unwrap();
    let response = transport
        .get(&format!("{}/elsewhere", server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(response.metadata.status, 200);
    assert_eq!(response.body, json!({"ok": true}));
}

#[tokio::test]
async fn missing_api_key_is_a_config_error() {
    let server = MockServer::start().await;
    let mut api = api_config(&server);
    api.api_key = String::new();
    let config = Config {
        api,
        ..Config::default()
    };

    assert!(matches!(
        Policies::from_config(&config),
        Err(Error::Config(_))
    ));
}

#[test]
fn policies_facade_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Policies>();
    assert_send_sync::<Arc<dyn Transport>>();
}
