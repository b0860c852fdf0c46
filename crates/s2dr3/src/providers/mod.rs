//! Serving provider implementations.
//!
//! This module contains the [`ServingProvider`] trait and the Vertex AI
//! implementation backing the deployment workflow.

pub mod traits;
pub mod vertex;

pub use traits::{
    DeployModelRequest, Prediction, RequestPayload, ServingEndpoint, ServingModel,
    ServingProvider, ServingProviderError, UploadModelRequest,
};
