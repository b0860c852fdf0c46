//! Integration tests for the provisioning workflow.
//!
//! These tests run the reconcilers and the prediction call against a
//! mocked Vertex AI control plane and verify the idempotent short-circuit
//! behavior, the wire shapes, and the end-to-end scenario.

use clap::Parser;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use s2dr3::args::Cli;
use s2dr3::config::DeployConfig;
use s2dr3::providers::vertex::Vertex;
use s2dr3::reconcile;
use s2dr3::{Prediction, ServingProvider, ServingProviderError};

// =============================================================================
// Helpers
// =============================================================================

const PARENT: &str = "projects/s2dr3-202312/locations/us-central1";
const MODEL_NAME: &str = "projects/862134799361/locations/us-central1/models/777";
const ENDPOINT_NAME: &str = "projects/862134799361/locations/us-central1/endpoints/4242";

/// Config pointed at the mock server, with fast operation polling.
fn test_config(server: &MockServer) -> DeployConfig {
    DeployConfig {
        api_base: server.uri(),
        operation_timeout_secs: 5,
        operation_poll_secs: 0,
        ..DeployConfig::default()
    }
}

fn test_platform(server: &MockServer) -> Vertex {
    Vertex::new(test_config(server), "test-token").expect("client should build")
}

fn model_json() -> serde_json::Value {
    json!({
        "name": MODEL_NAME,
        "displayName": "s2dr3",
        "versionId": "1",
        "createTime": "2023-12-04T10:00:00Z"
    })
}

fn endpoint_json() -> serde_json::Value {
    json!({
        "name": ENDPOINT_NAME,
        "displayName": "s2dr3-endpoint",
        "createTime": "2023-12-04T11:00:00Z"
    })
}

async fn mock_model_list(server: &MockServer, models: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/models")))
        .and(query_param("filter", r#"display_name="s2dr3""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_endpoint_list(server: &MockServer, endpoints: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/endpoints")))
        .and(query_param("filter", r#"display_name="s2dr3-endpoint""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "endpoints": endpoints })))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the full happy-path control plane for an empty project.
async fn mock_fresh_project(server: &MockServer) {
    mock_model_list(server, json!([])).await;

    // Upload returns a pending operation; one poll completes it.
    Mock::given(method("POST"))
        .and(path(format!("/v1/{PARENT}/models:upload")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-upload"),
            "done": false
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/operations/op-upload")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-upload"),
            "done": true,
            "response": {
                "@type": "type.googleapis.com/google.cloud.aiplatform.v1.UploadModelResponse",
                "model": MODEL_NAME,
                "modelVersionId": "1"
            }
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{MODEL_NAME}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json()))
        .expect(1)
        .mount(server)
        .await;

    mock_endpoint_list(server, json!([])).await;

    // Endpoint creation completes synchronously.
    Mock::given(method("POST"))
        .and(path(format!("/v1/{PARENT}/endpoints")))
        .and(body_json(json!({ "displayName": "s2dr3-endpoint" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-create"),
            "done": true,
            "response": {
                "@type": "type.googleapis.com/google.cloud.aiplatform.v1.Endpoint",
                "name": ENDPOINT_NAME,
                "displayName": "s2dr3-endpoint"
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{ENDPOINT_NAME}:deployModel")))
        .and(body_partial_json(json!({
            "deployedModel": {
                "model": MODEL_NAME,
                "dedicatedResources": {
                    "machineSpec": {
                        "machineType": "n1-standard-2",
                        "acceleratorType": "NVIDIA_TESLA_T4",
                        "acceleratorCount": 1
                    },
                    "minReplicaCount": 1,
                    "maxReplicaCount": 1
                }
            },
            "trafficSplit": { "0": 100 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-deploy"),
            "done": true
        })))
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Model resolver
// =============================================================================

#[tokio::test]
async fn test_existing_model_short_circuits_upload() {
    let server = MockServer::start().await;
    mock_model_list(&server, json!([model_json()])).await;

    // No upload route is mounted: an upload attempt would fail the test.
    let platform = test_platform(&server);
    let reconciled = reconcile::ensure_model(&platform, &test_config(&server))
        .await
        .expect("reconcile should succeed");

    assert!(!reconciled.created);
    assert_eq!(reconciled.handle.name, MODEL_NAME);
    assert_eq!(reconciled.handle.display_name, "s2dr3");
}

#[tokio::test]
async fn test_missing_model_uploads_and_polls_operation() {
    let server = MockServer::start().await;
    mock_model_list(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{PARENT}/models:upload")))
        .and(body_partial_json(json!({
            "model": {
                "displayName": "s2dr3",
                "containerSpec": {
                    "imageUri": "gcr.io/s2dr3-202312/s2dr3:success-1",
                    "predictRoute": "/predict",
                    "healthRoute": "/health",
                    "ports": [{ "containerPort": 8080 }]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-upload"),
            "done": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/operations/op-upload")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-upload"),
            "done": true,
            "response": { "model": MODEL_NAME, "modelVersionId": "1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/{MODEL_NAME}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json()))
        .expect(1)
        .mount(&server)
        .await;

    let platform = test_platform(&server);
    let reconciled = reconcile::ensure_model(&platform, &test_config(&server))
        .await
        .expect("reconcile should succeed");

    assert!(reconciled.created);
    assert_eq!(reconciled.handle.name, MODEL_NAME);
}

// =============================================================================
// Endpoint resolver
// =============================================================================

#[tokio::test]
async fn test_existing_endpoint_skips_creation_and_deployment() {
    let server = MockServer::start().await;
    mock_endpoint_list(&server, json!([endpoint_json()])).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{ENDPOINT_NAME}:deployModel")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let platform = test_platform(&server);
    let config = test_config(&server);
    let model = s2dr3::ServingModel {
        name: MODEL_NAME.to_string(),
        display_name: "s2dr3".to_string(),
        version_id: Some("1".to_string()),
        created_at: None,
    };

    let reconciled = reconcile::ensure_endpoint(&platform, &config, &model)
        .await
        .expect("reconcile should succeed");

    assert!(!reconciled.created);
    assert_eq!(reconciled.handle.name, ENDPOINT_NAME);
    assert_eq!(reconciled.handle.endpoint_id(), "4242");
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn test_forbidden_list_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/models")))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .expect(1)
        .mount(&server)
        .await;

    let platform = test_platform(&server);
    let err = platform.list_models("s2dr3").await.unwrap_err();

    assert!(matches!(err, ServingProviderError::Auth(_)));
}

#[tokio::test]
async fn test_predict_without_known_shape_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{ENDPOINT_NAME}:predict")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unrelated": true })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = test_platform(&server);
    let endpoint = s2dr3::ServingEndpoint {
        name: ENDPOINT_NAME.to_string(),
        display_name: "s2dr3-endpoint".to_string(),
        created_at: None,
    };

    let err = platform
        .predict(&endpoint, &s2dr3::RequestPayload::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServingProviderError::UnexpectedResponse(_)));
}

// =============================================================================
// End-to-end scenario
// =============================================================================

/// `--mgrs 31TCJ --date 2023-06-01` against an empty project: upload,
/// create, deploy, one predict POST carrying exactly the two overridden
/// options, and the third comma-segment of the fault message as summary.
#[tokio::test]
async fn test_end_to_end_fresh_project() {
    let server = MockServer::start().await;
    mock_fresh_project(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{ENDPOINT_NAME}:predict")))
        .and(body_json(json!({
            "instances": [{ "date": "2023-06-01", "mgrs": "31TCJ" }]
        })))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "MGRS 31TCJ,date 2023-06-01,S2DR3 job S2DR3_20230601_31TCJ has been submitted,ETA 20 minutes",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cli = Cli::parse_from(["s2dr3", "--mgrs", "31TCJ", "--date", "2023-06-01"]);
    let payload = cli.payload();

    let platform = test_platform(&server);
    let config = test_config(&server);

    let model = reconcile::ensure_model(&platform, &config)
        .await
        .expect("model reconcile should succeed");
    assert!(model.created);

    let endpoint = reconcile::ensure_endpoint(&platform, &config, &model.handle)
        .await
        .expect("endpoint reconcile should succeed");
    assert!(endpoint.created);

    let prediction = platform
        .predict(&endpoint.handle, &payload)
        .await
        .expect("predict should succeed");

    assert!(matches!(prediction, Prediction::Fault { code: 429, .. }));
    assert_eq!(
        prediction.summary(),
        "S2DR3 job S2DR3_20230601_31TCJ has been submitted"
    );
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test]
async fn test_teardown_undeploys_then_deletes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/{ENDPOINT_NAME}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": ENDPOINT_NAME,
            "displayName": "s2dr3-endpoint",
            "deployedModels": [{ "id": "dm-1", "model": MODEL_NAME }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/{ENDPOINT_NAME}:undeployModel")))
        .and(body_json(json!({ "deployedModelId": "dm-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-undeploy"),
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1/{ENDPOINT_NAME}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-delete-endpoint"),
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1/{MODEL_NAME}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("{PARENT}/operations/op-delete-model"),
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = test_platform(&server);
    let endpoint = s2dr3::ServingEndpoint {
        name: ENDPOINT_NAME.to_string(),
        display_name: "s2dr3-endpoint".to_string(),
        created_at: None,
    };
    let model = s2dr3::ServingModel {
        name: MODEL_NAME.to_string(),
        display_name: "s2dr3".to_string(),
        version_id: Some("1".to_string()),
        created_at: None,
    };

    reconcile::teardown(&platform, &endpoint, &model)
        .await
        .expect("teardown should succeed");
}
