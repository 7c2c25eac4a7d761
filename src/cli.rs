use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_ALLOWED_ORIGINS, DEFAULT_SERVICE_NAME};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a page and print the mobile-rewritten HTML (or raw bytes).
    Proxy(ProxyArgs),
    /// Fetch a page and print its extraction record as JSON.
    Extract(TargetArgs),
    /// Fetch a page and print its head metadata as JSON.
    Metadata(TargetArgs),
    /// Print search refinements for a query as JSON.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub query: String,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Page to fetch; `https://` is assumed when no scheme is given.
    #[arg(long)]
    pub url: String,
}

#[derive(Debug, Args)]
pub struct ProxyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the body here instead of stdout.
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct ServerArgs {
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: SocketAddr,

    /// Origins allowed to make credentialed cross-origin calls.
    /// `HELLONET_ALLOWED_ORIGINS` overrides this when set.
    #[arg(
        long = "allowed-origin",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_ORIGINS.map(str::to_owned)
    )]
    pub allowed_origins: Vec<String>,

    /// Name reported by `/health`.
    #[arg(long, default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,
}
