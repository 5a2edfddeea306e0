use clap::Parser;
use clipboard_bridge::bootstrap::{init_tracing_subscriber, resolve_config};
use clipboard_bridge::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.clone())?;
    init_tracing_subscriber(&config.log)?;
    tracing::debug!(?config, "configuration loaded");

    cli::run(cli, config).await
}
