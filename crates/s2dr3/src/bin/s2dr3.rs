//! S2DR3 CLI - provision the Vertex AI serving stack and submit one inference job.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use s2dr3::args::Cli;
use s2dr3::config::DeployConfig;
use s2dr3::providers::vertex::auth::{self, ServiceAccountKey};
use s2dr3::providers::vertex::Vertex;
use s2dr3::reconcile;
use s2dr3::ServingProvider;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = DeployConfig::default();
    let payload = cli.payload();

    // Resolve credentials
    let key = ServiceAccountKey::from_file(&cli.key_file)
        .with_context(|| format!("Failed to load service-account key from {}", cli.key_file))?;
    let token = auth::fetch_access_token(&key)
        .await
        .context("Failed to obtain an access token")?;

    let platform = Vertex::new(config.clone(), token.access_token)
        .context("Failed to create Vertex AI provider")?;

    println!("\n🔎 Checking models ...");
    let model = reconcile::ensure_model(&platform, &config).await?;
    if model.created {
        println!(
            "✅ Model {} imported from {}",
            config.model_display_name, config.image_uri
        );
    } else {
        println!(
            "✅ Model {} was already imported",
            config.model_display_name
        );
    }

    println!("\n🔎 Checking endpoints ...");
    let endpoint = reconcile::ensure_endpoint(&platform, &config, &model.handle).await?;
    if endpoint.created {
        println!(
            "✅ Endpoint {} created, model deployed",
            config.endpoint_display_name
        );
    } else {
        println!(
            "✅ Endpoint {} was already created",
            config.endpoint_display_name
        );
    }

    println!("\n⚡ Requesting inference ...");
    let prediction = platform.predict(&endpoint.handle, &payload).await?;

    println!("\n{}\n", prediction.summary());

    let reply: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Do you keep the Vertex AI endpoint alive? Press y(yes) or n(no)")
        .allow_empty(true)
        .interact_text()?;

    if reconcile::is_teardown_reply(&reply) {
        println!("\n🧹 Removing serving resources ...");
        reconcile::teardown(&platform, &endpoint.handle, &model.handle).await?;
        println!("✅ Endpoint and model removed");
    } else {
        println!(
            "\n💡 Endpoint {} stays alive; delete it manually when done to stop billing",
            config.endpoint_display_name
        );
    }

    Ok(())
}
