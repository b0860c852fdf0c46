//! Deployment configuration.

/// GCP project that owns the serving stack.
const PROJECT_NAME: &str = "s2dr3-202312";

/// Region every resource lives in.
const LOCATION: &str = "us-central1";

/// Display name of the model registry entry.
const MODEL_NAME: &str = "s2dr3";

/// Display name of the serving endpoint.
const ENDPOINT_NAME: &str = "s2dr3-endpoint";

/// Serving container image.
const IMG_URI: &str = "gcr.io/s2dr3-202312/s2dr3:success-1";

/// Prediction route inside the container.
const PREDICT_PATH: &str = "/predict";

/// Health check route inside the container.
const HEALTH_PATH: &str = "/health";

/// Port the container listens on.
const SERVER_PORT: u16 = 8080;

/// Machine type backing the deployment.
const MACHINE_TYPE: &str = "n1-standard-2";

/// Accelerator attached to each replica.
const ACCELERATOR_TYPE: &str = "NVIDIA_TESLA_T4";

/// Upload and deployment can take 20-30 minutes on the platform side.
const OPERATION_TIMEOUT_SECS: u64 = 1800;

/// Polling interval when waiting for operations.
const OPERATION_POLL_SECS: u64 = 10;

/// Immutable deployment configuration threaded through all platform calls.
///
/// Defaults describe the production S2DR3 serving stack; tests override the
/// API base to point at a mock control plane.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// GCP project ID.
    pub project: String,
    /// Region for all resources.
    pub location: String,
    /// Control-plane base URL.
    pub api_base: String,
    /// Model display name used for registry lookup.
    pub model_display_name: String,
    /// Endpoint display name used for endpoint lookup.
    pub endpoint_display_name: String,
    /// Serving container image URI.
    pub image_uri: String,
    /// Prediction route of the container.
    pub predict_route: String,
    /// Health route of the container.
    pub health_route: String,
    /// Port of the container.
    pub container_port: u16,
    /// Machine type for the deployment.
    pub machine_type: String,
    /// Accelerator type for the deployment.
    pub accelerator_type: String,
    /// Accelerators per replica.
    pub accelerator_count: u32,
    /// Minimum replica count.
    pub min_replica_count: u32,
    /// Maximum replica count.
    pub max_replica_count: u32,
    /// Ceiling for a single long-running operation wait.
    pub operation_timeout_secs: u64,
    /// Interval between operation status polls.
    pub operation_poll_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            project: PROJECT_NAME.to_string(),
            location: LOCATION.to_string(),
            api_base: api_base_for(LOCATION),
            model_display_name: MODEL_NAME.to_string(),
            endpoint_display_name: ENDPOINT_NAME.to_string(),
            image_uri: IMG_URI.to_string(),
            predict_route: PREDICT_PATH.to_string(),
            health_route: HEALTH_PATH.to_string(),
            container_port: SERVER_PORT,
            machine_type: MACHINE_TYPE.to_string(),
            accelerator_type: ACCELERATOR_TYPE.to_string(),
            accelerator_count: 1,
            min_replica_count: 1,
            max_replica_count: 1,
            operation_timeout_secs: OPERATION_TIMEOUT_SECS,
            operation_poll_secs: OPERATION_POLL_SECS,
        }
    }
}

impl DeployConfig {
    /// Parent resource path for list/create calls.
    #[must_use]
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }
}

/// Regional control-plane base URL.
fn api_base_for(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}
