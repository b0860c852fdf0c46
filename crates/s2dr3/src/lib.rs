//! Vertex AI serving deployment for the S2DR3 super-resolution model.
//!
//! This crate provisions the managed serving stack for S2DR3 (Sentinel-2
//! Deep Resolution 3.0) and submits one inference job against it. All of
//! the heavy lifting — model packaging, GPU provisioning, autoscaling,
//! inference — belongs to the platform; this tool reconciles the resources
//! and drives one request through them.
//!
//! ## Workflow
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────────────────────────────┐
//! │  CLI flags   │   │              Vertex AI (us-central1)        │
//! │  → payload   │   ├─────────────────────────────────────────────┤
//! └──────┬───────┘   │  ┌───────────────┐     ┌─────────────────┐  │
//!        │           │  │ Model registry │────►│ s2dr3-endpoint  │  │
//!        ▼           │  │  s2dr3 (T4)    │     │  n1-standard-2  │  │
//! ensure_model ──────┼─►└───────────────┘     └────────┬────────┘  │
//! ensure_endpoint ───┼───────────────────────────────► │           │
//! predict ───────────┼─────────────────────────────────┘           │
//! teardown (opt.) ───┼─► undeploy, delete endpoint, delete model   │
//!                    └─────────────────────────────────────────────┘
//! ```
//!
//! Each step is an idempotent get-or-create: a resource that already
//! carries the expected display name is reused, anything missing is
//! provisioned and awaited.

pub mod args;
pub mod config;
pub mod providers;
pub mod reconcile;

pub use providers::traits::{
    Prediction, RequestPayload, ServingEndpoint, ServingModel, ServingProvider,
    ServingProviderError,
};
