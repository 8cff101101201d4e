//! `weave-server` -- reference connector service.

mod actions;
mod cli;
mod wiring;

use anyhow::Context as _;
use clap::Parser;
use tracing::Instrument as _;
use weave_action::{ConfigMap, IntegrationId};
use weave_api::{AppState, router};
use weave_config::Settings;
use weave_log::LoggerBuilder;
use weave_runtime::DispatchOutcome;

use crate::cli::{Cli, Command};
use crate::wiring::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let logger = LoggerBuilder::from_config(settings.log.clone())
        .build()
        .context("initialising logger")?;

    run(cli.command, &settings)
        .instrument(logger.span().clone())
        .await
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let registry = actions::registry().context("building action registry")?;
    let services = Services::from_settings(settings, registry)?;

    match command {
        Command::Serve => serve(settings, services).await,
        Command::Register {
            type_slug,
            service_url,
        } => {
            let response = services
                .registration
                .register(
                    services.registry_client.as_ref(),
                    type_slug.as_deref(),
                    service_url
                        .as_deref()
                        .or(settings.integration.service_url.as_deref()),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Actions => {
            let entries = services.registry.entries();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
        Command::Trigger {
            integration_id,
            action_id,
            overrides,
        } => {
            let overrides: ConfigMap =
                serde_json::from_str(&overrides).context("--overrides must be a JSON object")?;
            let outcome = services
                .dispatcher
                .trigger_action(&IntegrationId::new(integration_id), &action_id, overrides)
                .await?;
            match outcome {
                DispatchOutcome::Executed(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                DispatchOutcome::Published { topic, message_id } => {
                    println!("published {message_id} to {topic}");
                }
            }
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, services: Services) -> anyhow::Result<()> {
    if settings.server.register_on_startup {
        services
            .registration
            .register(
                services.registry_client.as_ref(),
                None,
                settings.integration.service_url.as_deref(),
            )
            .await
            .context("self-registration failed")?;
    }

    let app = router(AppState::new(services.runner).with_parent_span(tracing::Span::current()));
    let listener = tokio::net::TcpListener::bind(settings.server.bind)
        .await
        .with_context(|| format!("binding {}", settings.server.bind))?;
    tracing::info!(bind = %settings.server.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
