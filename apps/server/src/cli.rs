//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reference Weave connector service.
#[derive(Debug, Parser)]
#[command(name = "weave-server", version, about)]
pub struct Cli {
    /// TOML settings file, merged between defaults and `WEAVE_*` variables.
    #[arg(short, long, global = true, env = "WEAVE_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP surface (registering first unless disabled).
    Serve,

    /// Register the integration type and its actions, then exit.
    Register {
        /// Integration type slug; defaults to `integration.type_slug`.
        #[arg(long)]
        type_slug: Option<String>,
        /// Public URL of this service; defaults to `integration.service_url`.
        #[arg(long)]
        service_url: Option<String>,
    },

    /// Print the registered actions with their JSON schemas.
    Actions,

    /// Trigger an action through the dispatcher.
    Trigger {
        /// Target integration.
        integration_id: String,
        /// Action identifier.
        action_id: String,
        /// JSON object of configuration overrides.
        #[arg(long, default_value = "{}")]
        overrides: String,
    },
}
