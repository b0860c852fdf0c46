//! Serving provider trait and common types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request payload sent as the single prediction instance.
///
/// Keys are CLI option names, values their stringified settings. Only
/// options changed from their defaults are present.
pub type RequestPayload = BTreeMap<String, String>;

/// Errors that can occur during serving provider operations.
#[derive(Error, Debug)]
pub enum ServingProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication or authorization failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Operation timed out.
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Long-running operation completed with an error.
    #[error("Operation failed: {0}")]
    Operation(String),

    /// Response had a shape the client does not understand.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A model registered in the platform's model registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingModel {
    /// Fully-qualified resource name.
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Registry version ID, if assigned.
    pub version_id: Option<String>,
    /// When the model was registered.
    pub created_at: Option<DateTime<Utc>>,
}

/// An endpoint hosting deployed models behind a prediction URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingEndpoint {
    /// Fully-qualified resource name.
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// When the endpoint was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl ServingEndpoint {
    /// The platform-assigned endpoint ID (last segment of the resource name).
    #[must_use]
    pub fn endpoint_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Request to register a model from a serving container image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadModelRequest {
    /// Display name for the registry entry.
    pub display_name: String,
    /// Serving container image URI.
    pub image_uri: String,
    /// HTTP route the container serves predictions on.
    pub predict_route: String,
    /// HTTP route the container serves health checks on.
    pub health_route: String,
    /// Port the container listens on.
    pub port: u16,
}

/// Request to deploy a registered model to an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployModelRequest {
    /// Display name for the deployed-model binding.
    pub display_name: String,
    /// Machine type backing the deployment.
    pub machine_type: String,
    /// Accelerator type attached to each replica.
    pub accelerator_type: String,
    /// Accelerators per replica.
    pub accelerator_count: u32,
    /// Minimum replica count.
    pub min_replica_count: u32,
    /// Maximum replica count.
    pub max_replica_count: u32,
    /// Traffic percentage routed to this deployment.
    pub traffic_percentage: u32,
}

/// Outcome of a prediction request, split by response shape.
///
/// The S2DR3 serving container reports job submission through a
/// `google.rpc.Status` error payload, so a fault here is the expected
/// result of a normal run.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// Standard prediction payload.
    Predictions(Vec<serde_json::Value>),
    /// Error-shaped payload from the serving container.
    Fault {
        /// `google.rpc.Code` number.
        code: i32,
        /// Full status message.
        message: String,
    },
}

impl Prediction {
    /// Human-readable result line.
    ///
    /// Fault messages are comma-separated job descriptors; the third
    /// segment is the part meant for the operator. Shorter messages are
    /// returned whole.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Predictions(values) => serde_json::to_string(values).unwrap_or_default(),
            Self::Fault { message, .. } => {
                let segments: Vec<&str> = message.split(',').collect();
                if segments.len() >= 3 {
                    segments[2].to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

/// Trait for managed model-serving platforms.
#[async_trait]
pub trait ServingProvider: Send + Sync {
    /// List registered models with the given display name.
    async fn list_models(
        &self,
        display_name: &str,
    ) -> Result<Vec<ServingModel>, ServingProviderError>;

    /// Register a model from a container image, blocking until done.
    async fn upload_model(
        &self,
        req: UploadModelRequest,
    ) -> Result<ServingModel, ServingProviderError>;

    /// List endpoints with the given display name.
    async fn list_endpoints(
        &self,
        display_name: &str,
    ) -> Result<Vec<ServingEndpoint>, ServingProviderError>;

    /// Create an empty endpoint, blocking until done.
    async fn create_endpoint(
        &self,
        display_name: &str,
    ) -> Result<ServingEndpoint, ServingProviderError>;

    /// Deploy a model to an endpoint, blocking until done.
    async fn deploy_model(
        &self,
        endpoint: &ServingEndpoint,
        model: &ServingModel,
        req: DeployModelRequest,
    ) -> Result<(), ServingProviderError>;

    /// Issue one synchronous prediction request.
    async fn predict(
        &self,
        endpoint: &ServingEndpoint,
        payload: &RequestPayload,
    ) -> Result<Prediction, ServingProviderError>;

    /// Undeploy every model currently deployed to an endpoint.
    async fn undeploy_all(&self, endpoint: &ServingEndpoint) -> Result<(), ServingProviderError>;

    /// Delete an endpoint.
    async fn delete_endpoint(&self, endpoint: &ServingEndpoint)
        -> Result<(), ServingProviderError>;

    /// Delete a registered model.
    async fn delete_model(&self, model: &ServingModel) -> Result<(), ServingProviderError>;
}
