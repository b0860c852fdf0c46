//! Vertex AI v1 REST request and response models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Model registry types
// ============================================================================

/// Model resource from the registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResource {
    /// Fully-qualified resource name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Registry version ID.
    pub version_id: Option<String>,
    /// Serving container spec.
    pub container_spec: Option<ContainerSpec>,
    /// Create time (RFC 3339).
    pub create_time: Option<String>,
}

/// Response to a model list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    /// Matching models.
    #[serde(default)]
    pub models: Vec<ModelResource>,
}

/// Serving container specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Container image URI.
    pub image_uri: String,
    /// Prediction route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predict_route: Option<String>,
    /// Health check route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Ports the container listens on.
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
}

/// Container port entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port number.
    pub container_port: u16,
}

/// Request body for `models:upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadModelBody {
    /// Model definition.
    pub model: ModelDefinition,
}

/// Model definition for upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    /// Display name.
    pub display_name: String,
    /// Serving container spec.
    pub container_spec: ContainerSpec,
}

/// Operation response payload of a completed `models:upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadModelResult {
    /// Resource name of the registered model.
    pub model: String,
    /// Version created by the upload.
    pub model_version_id: Option<String>,
}

// ============================================================================
// Endpoint types
// ============================================================================

/// Endpoint resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResource {
    /// Fully-qualified resource name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Models deployed to this endpoint.
    #[serde(default)]
    pub deployed_models: Vec<DeployedModel>,
    /// Create time (RFC 3339).
    pub create_time: Option<String>,
}

/// Response to an endpoint list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEndpointsResponse {
    /// Matching endpoints.
    #[serde(default)]
    pub endpoints: Vec<EndpointResource>,
}

/// A model deployed to an endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedModel {
    /// Deployment binding ID.
    pub id: String,
    /// Resource name of the deployed model.
    pub model: Option<String>,
    /// Display name of the binding.
    pub display_name: Option<String>,
}

/// Request body for endpoint creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEndpointBody {
    /// Display name.
    pub display_name: String,
}

/// Request body for `endpoints/*:deployModel`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployModelBody {
    /// Deployed-model definition.
    pub deployed_model: DeployedModelDefinition,
    /// Traffic split keyed by deployed-model ID ("0" means this one).
    pub traffic_split: HashMap<String, u32>,
}

/// Deployed-model definition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedModelDefinition {
    /// Resource name of the model to deploy.
    pub model: String,
    /// Display name for the binding.
    pub display_name: String,
    /// Compute allocation.
    pub dedicated_resources: DedicatedResources,
}

/// Dedicated compute resources for a deployment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedicatedResources {
    /// Machine and accelerator spec.
    pub machine_spec: MachineSpec,
    /// Minimum replica count.
    pub min_replica_count: u32,
    /// Maximum replica count.
    pub max_replica_count: u32,
}

/// Machine and accelerator specification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Machine type (e.g., `n1-standard-2`).
    pub machine_type: String,
    /// Accelerator type (e.g., `NVIDIA_TESLA_T4`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_type: Option<String>,
    /// Accelerators per replica.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_count: Option<u32>,
}

/// Request body for `endpoints/*:undeployModel`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeployModelBody {
    /// Deployment binding ID to remove.
    pub deployed_model_id: String,
}

// ============================================================================
// Long-running operations
// ============================================================================

/// `google.longrunning.Operation`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation resource name.
    pub name: String,
    /// Whether the operation has completed.
    #[serde(default)]
    pub done: bool,
    /// Terminal error, if the operation failed.
    pub error: Option<RpcStatus>,
    /// Terminal response, if the operation succeeded.
    pub response: Option<serde_json::Value>,
}

/// `google.rpc.Status` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcStatus {
    /// Status code number.
    #[serde(default)]
    pub code: i32,
    /// Status message.
    #[serde(default)]
    pub message: String,
    /// Canonical code name (REST error payloads only).
    pub status: Option<String>,
}

// ============================================================================
// Prediction types
// ============================================================================

/// Request body for `endpoints/*:predict`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictBody {
    /// Prediction instances (this workflow always sends exactly one).
    pub instances: Vec<serde_json::Value>,
}

/// Response body of `endpoints/*:predict`.
///
/// The serving container answers either with `predictions` or with an
/// error-shaped body; both arrive with HTTP details the caller cannot rely
/// on, so both fields are optional and the client decides the shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    /// Prediction results.
    pub predictions: Option<Vec<serde_json::Value>>,
    /// Error payload.
    pub error: Option<RpcStatus>,
    /// ID of the deployed model that served the request.
    pub deployed_model_id: Option<String>,
}
