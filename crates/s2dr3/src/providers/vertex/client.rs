//! Vertex AI control-plane client implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use super::models::{
    ContainerPort, ContainerSpec, CreateEndpointBody, DedicatedResources, DeployModelBody,
    DeployedModelDefinition, EndpointResource, ListEndpointsResponse, ListModelsResponse,
    MachineSpec, ModelDefinition, ModelResource, Operation, PredictBody, PredictResponse,
    UndeployModelBody, UploadModelBody, UploadModelResult,
};
use crate::config::DeployConfig;
use crate::providers::traits::{
    DeployModelRequest, Prediction, RequestPayload, ServingEndpoint, ServingModel,
    ServingProvider, ServingProviderError, UploadModelRequest,
};

/// Default timeout for control-plane API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for the synchronous prediction call; the container answers only
/// after it has looked at the job.
const PREDICT_TIMEOUT_SECS: u64 = 300;

/// Vertex AI serving provider.
#[derive(Clone)]
pub struct Vertex {
    /// HTTP client.
    client: Client,
    /// Deployment configuration.
    config: DeployConfig,
    /// OAuth2 bearer token.
    access_token: String,
}

impl Vertex {
    /// Create a new Vertex AI provider.
    ///
    /// # Arguments
    /// * `config` - deployment configuration (project, location, specs)
    /// * `access_token` - `OAuth2` access token
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        config: DeployConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, ServingProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            config,
            access_token: access_token.into(),
        })
    }

    /// Full URL for a v1 resource path.
    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.api_base)
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServingProviderError> {
        let url = self.url(path);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make an authenticated GET request with a list filter.
    async fn get_filtered<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        filter: &str,
    ) -> Result<T, ServingProviderError> {
        let url = self.url(path);
        debug!(url = %url, filter = %filter, "GET request");

        let response = self
            .client
            .get(&url)
            .query(&[("filter", filter)])
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ServingProviderError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let url = self.url(path);
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a resource and await the returned operation.
    ///
    /// A missing resource is treated as already deleted.
    async fn delete_resource(&self, name: &str) -> Result<(), ServingProviderError> {
        let url = self.url(name);
        debug!(url = %url, "DELETE request");

        let response = self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ServingProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let operation: Operation = serde_json::from_str(&text)?;
        self.wait_operation(operation).await?;
        Ok(())
    }

    /// Handle API response, parsing JSON or mapping the error status.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ServingProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ServingProviderError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ServingProviderError::NotFound(text))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ServingProviderError::Auth(text))
        } else {
            Err(ServingProviderError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Poll a long-running operation until it completes.
    async fn wait_operation(
        &self,
        operation: Operation,
    ) -> Result<Operation, ServingProviderError> {
        let start = std::time::Instant::now();
        let timeout = Duration::from_secs(self.config.operation_timeout_secs);
        let mut operation = operation;

        loop {
            if operation.done {
                if let Some(error) = operation.error {
                    return Err(ServingProviderError::Operation(format!(
                        "{} (code {})",
                        error.message, error.code
                    )));
                }
                return Ok(operation);
            }

            if start.elapsed() > timeout {
                return Err(ServingProviderError::Timeout(
                    self.config.operation_timeout_secs,
                ));
            }

            debug!(
                operation = %operation.name,
                elapsed_secs = start.elapsed().as_secs(),
                "Polling operation"
            );

            tokio::time::sleep(Duration::from_secs(self.config.operation_poll_secs)).await;
            let refreshed: Operation = self.get(&operation.name).await?;
            operation = refreshed;
        }
    }

    /// Typed response payload of a completed operation.
    fn operation_result<T: serde::de::DeserializeOwned>(
        operation: &Operation,
    ) -> Result<T, ServingProviderError> {
        let response = operation.response.clone().ok_or_else(|| {
            ServingProviderError::UnexpectedResponse(format!(
                "operation {} completed without a response payload",
                operation.name
            ))
        })?;
        serde_json::from_value(response).map_err(ServingProviderError::Serialization)
    }

    /// Display-name list filter.
    fn display_name_filter(display_name: &str) -> String {
        format!(r#"display_name="{display_name}""#)
    }

    /// Convert an API model resource to our `ServingModel` type.
    fn to_model(resource: &ModelResource) -> ServingModel {
        ServingModel {
            name: resource.name.clone(),
            display_name: resource.display_name.clone(),
            version_id: resource.version_id.clone(),
            created_at: resource
                .create_time
                .as_ref()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
        }
    }

    /// Convert an API endpoint resource to our `ServingEndpoint` type.
    fn to_endpoint(resource: &EndpointResource) -> ServingEndpoint {
        ServingEndpoint {
            name: resource.name.clone(),
            display_name: resource.display_name.clone(),
            created_at: resource
                .create_time
                .as_ref()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
        }
    }
}

#[async_trait]
impl ServingProvider for Vertex {
    async fn list_models(
        &self,
        display_name: &str,
    ) -> Result<Vec<ServingModel>, ServingProviderError> {
        let response: ListModelsResponse = self
            .get_filtered(
                &format!("{}/models", self.config.parent()),
                &Self::display_name_filter(display_name),
            )
            .await?;
        Ok(response.models.iter().map(Self::to_model).collect())
    }

    async fn upload_model(
        &self,
        req: UploadModelRequest,
    ) -> Result<ServingModel, ServingProviderError> {
        info!(
            display_name = %req.display_name,
            image_uri = %req.image_uri,
            "Uploading model from container registry"
        );

        let body = UploadModelBody {
            model: ModelDefinition {
                display_name: req.display_name,
                container_spec: ContainerSpec {
                    image_uri: req.image_uri,
                    predict_route: Some(req.predict_route),
                    health_route: Some(req.health_route),
                    ports: vec![ContainerPort {
                        container_port: req.port,
                    }],
                },
            },
        };

        let operation: Operation = self
            .post(&format!("{}/models:upload", self.config.parent()), &body)
            .await?;
        let operation = self.wait_operation(operation).await?;
        let result: UploadModelResult = Self::operation_result(&operation)?;

        let resource: ModelResource = self.get(&result.model).await?;
        let model = Self::to_model(&resource);

        info!(model = %model.name, "Model upload complete");
        Ok(model)
    }

    async fn list_endpoints(
        &self,
        display_name: &str,
    ) -> Result<Vec<ServingEndpoint>, ServingProviderError> {
        let response: ListEndpointsResponse = self
            .get_filtered(
                &format!("{}/endpoints", self.config.parent()),
                &Self::display_name_filter(display_name),
            )
            .await?;
        Ok(response.endpoints.iter().map(Self::to_endpoint).collect())
    }

    async fn create_endpoint(
        &self,
        display_name: &str,
    ) -> Result<ServingEndpoint, ServingProviderError> {
        info!(display_name = %display_name, "Creating endpoint");

        let body = CreateEndpointBody {
            display_name: display_name.to_string(),
        };

        let operation: Operation = self
            .post(&format!("{}/endpoints", self.config.parent()), &body)
            .await?;
        let operation = self.wait_operation(operation).await?;
        let resource: EndpointResource = Self::operation_result(&operation)?;

        let endpoint = Self::to_endpoint(&resource);
        info!(endpoint = %endpoint.name, "Endpoint created");
        Ok(endpoint)
    }

    async fn deploy_model(
        &self,
        endpoint: &ServingEndpoint,
        model: &ServingModel,
        req: DeployModelRequest,
    ) -> Result<(), ServingProviderError> {
        info!(
            endpoint = %endpoint.name,
            model = %model.name,
            machine_type = %req.machine_type,
            accelerator = %req.accelerator_type,
            "Deploying model to endpoint"
        );

        let body = DeployModelBody {
            deployed_model: DeployedModelDefinition {
                model: model.name.clone(),
                display_name: req.display_name,
                dedicated_resources: DedicatedResources {
                    machine_spec: MachineSpec {
                        machine_type: req.machine_type,
                        accelerator_type: Some(req.accelerator_type),
                        accelerator_count: Some(req.accelerator_count),
                    },
                    min_replica_count: req.min_replica_count,
                    max_replica_count: req.max_replica_count,
                },
            },
            traffic_split: HashMap::from([("0".to_string(), req.traffic_percentage)]),
        };

        let operation: Operation = self
            .post(&format!("{}:deployModel", endpoint.name), &body)
            .await?;
        self.wait_operation(operation).await?;

        info!(endpoint = %endpoint.name, "Model deployment complete");
        Ok(())
    }

    async fn predict(
        &self,
        endpoint: &ServingEndpoint,
        payload: &RequestPayload,
    ) -> Result<Prediction, ServingProviderError> {
        let url = self.url(&format!("{}:predict", endpoint.name));
        debug!(url = %url, "POST request (predict)");

        let body = PredictBody {
            instances: vec![serde_json::to_value(payload)?],
        };

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(PREDICT_TIMEOUT_SECS))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // The serving container reports job status through an error-shaped
        // body with a non-2xx status, so the shape of the JSON decides the
        // outcome here, not the HTTP status.
        let status = response.status();
        let text = response.text().await?;
        let parsed: PredictResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse predict response");
            ServingProviderError::Serialization(e)
        })?;

        if let Some(predictions) = parsed.predictions {
            return Ok(Prediction::Predictions(predictions));
        }
        if let Some(error) = parsed.error {
            return Ok(Prediction::Fault {
                code: error.code,
                message: error.message,
            });
        }

        Err(ServingProviderError::UnexpectedResponse(format!(
            "predict returned HTTP {status} with neither predictions nor error"
        )))
    }

    async fn undeploy_all(&self, endpoint: &ServingEndpoint) -> Result<(), ServingProviderError> {
        let resource: EndpointResource = self.get(&endpoint.name).await?;

        for deployed in &resource.deployed_models {
            info!(
                endpoint = %endpoint.name,
                deployed_model_id = %deployed.id,
                "Undeploying model"
            );

            let body = UndeployModelBody {
                deployed_model_id: deployed.id.clone(),
            };
            let operation: Operation = self
                .post(&format!("{}:undeployModel", endpoint.name), &body)
                .await?;
            self.wait_operation(operation).await?;
        }

        Ok(())
    }

    async fn delete_endpoint(
        &self,
        endpoint: &ServingEndpoint,
    ) -> Result<(), ServingProviderError> {
        info!(endpoint = %endpoint.name, "Deleting endpoint");
        self.delete_resource(&endpoint.name).await?;
        info!(endpoint = %endpoint.name, "Endpoint deleted");
        Ok(())
    }

    async fn delete_model(&self, model: &ServingModel) -> Result<(), ServingProviderError> {
        info!(model = %model.name, "Deleting model");
        self.delete_resource(&model.name).await?;
        info!(model = %model.name, "Model deleted");
        Ok(())
    }
}
