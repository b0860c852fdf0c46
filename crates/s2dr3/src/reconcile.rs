//! Idempotent reconciliation of serving resources.
//!
//! Every run converges the platform toward one registered model and one
//! endpoint serving it. Lookups go by exact display name; a hit is reused
//! as-is, a miss provisions the resource and blocks until the platform
//! reports completion.

use tracing::info;

use crate::config::DeployConfig;
use crate::providers::traits::{
    DeployModelRequest, ServingEndpoint, ServingModel, ServingProvider, ServingProviderError,
    UploadModelRequest,
};

/// Result of a get-or-create reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciled<T> {
    /// Typed handle to the platform resource.
    pub handle: T,
    /// Whether this run created the resource.
    pub created: bool,
}

/// Resolve the registered model, uploading it if absent.
///
/// A pre-existing model with the configured display name is reused without
/// any version check.
///
/// # Errors
/// Returns an error if the registry lookup or the upload fails.
pub async fn ensure_model<P: ServingProvider>(
    platform: &P,
    config: &DeployConfig,
) -> Result<Reconciled<ServingModel>, ServingProviderError> {
    if let Some(model) = platform
        .list_models(&config.model_display_name)
        .await?
        .into_iter()
        .next()
    {
        info!(model = %model.name, "Model already registered");
        return Ok(Reconciled {
            handle: model,
            created: false,
        });
    }

    info!(
        display_name = %config.model_display_name,
        image_uri = %config.image_uri,
        "Model not found, importing from container registry"
    );

    let model = platform
        .upload_model(UploadModelRequest {
            display_name: config.model_display_name.clone(),
            image_uri: config.image_uri.clone(),
            predict_route: config.predict_route.clone(),
            health_route: config.health_route.clone(),
            port: config.container_port,
        })
        .await?;

    Ok(Reconciled {
        handle: model,
        created: true,
    })
}

/// Resolve the serving endpoint, creating and deploying to it if absent.
///
/// A pre-existing endpoint with the configured display name short-circuits
/// both creation and deployment.
///
/// # Errors
/// Returns an error if the lookup, creation, or deployment fails.
pub async fn ensure_endpoint<P: ServingProvider>(
    platform: &P,
    config: &DeployConfig,
    model: &ServingModel,
) -> Result<Reconciled<ServingEndpoint>, ServingProviderError> {
    if let Some(endpoint) = platform
        .list_endpoints(&config.endpoint_display_name)
        .await?
        .into_iter()
        .next()
    {
        // TODO: check `deployedModels` before skipping; a pre-existing
        // endpoint with nothing deployed to it is reused as-is and the
        // prediction call will fail downstream.
        info!(endpoint = %endpoint.name, "Endpoint already exists, skipping deployment");
        return Ok(Reconciled {
            handle: endpoint,
            created: false,
        });
    }

    info!(
        display_name = %config.endpoint_display_name,
        "Endpoint not found, creating"
    );

    let endpoint = platform
        .create_endpoint(&config.endpoint_display_name)
        .await?;

    info!(
        endpoint = %endpoint.name,
        model = %model.name,
        "Deploying model, this takes about 20-30 minutes"
    );

    platform
        .deploy_model(
            &endpoint,
            model,
            DeployModelRequest {
                display_name: config.model_display_name.clone(),
                machine_type: config.machine_type.clone(),
                accelerator_type: config.accelerator_type.clone(),
                accelerator_count: config.accelerator_count,
                min_replica_count: config.min_replica_count,
                max_replica_count: config.max_replica_count,
                traffic_percentage: 100,
            },
        )
        .await?;

    Ok(Reconciled {
        handle: endpoint,
        created: true,
    })
}

/// Remove everything this tool provisions: undeploy all models from the
/// endpoint, delete the endpoint, then delete the model.
///
/// # Errors
/// Returns the first platform error; no partial-failure recovery.
pub async fn teardown<P: ServingProvider>(
    platform: &P,
    endpoint: &ServingEndpoint,
    model: &ServingModel,
) -> Result<(), ServingProviderError> {
    info!(endpoint = %endpoint.name, model = %model.name, "Tearing down serving resources");

    platform.undeploy_all(endpoint).await?;
    platform.delete_endpoint(endpoint).await?;
    platform.delete_model(model).await?;

    Ok(())
}

/// Whether a teardown prompt reply asks for removal.
///
/// Only `n` and `no` tear resources down; anything else keeps the endpoint
/// (and its costs) alive.
#[must_use]
pub fn is_teardown_reply(reply: &str) -> bool {
    matches!(reply.trim(), "n" | "no")
}
