//! Vertex AI serving provider.
//!
//! Implements the [`ServingProvider`] trait against the Vertex AI v1 REST
//! control plane, plus service-account authentication.
//!
//! ## Example
//!
//! ```ignore
//! use s2dr3::config::DeployConfig;
//! use s2dr3::providers::vertex::{auth, Vertex};
//!
//! let key = auth::ServiceAccountKey::from_file("credentials.json")?;
//! let token = auth::fetch_access_token(&key).await?;
//! let platform = Vertex::new(DeployConfig::default(), token.access_token)?;
//!
//! let models = platform.list_models("s2dr3").await?;
//! ```
//!
//! [`ServingProvider`]: crate::providers::traits::ServingProvider

pub mod auth;
mod client;
mod models;

pub use client::Vertex;
pub use models::*;
