//! icinga2alerta - Main Entry Point

use bridge::{init_logging, run, Cli};
use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    info!("=== icinga2alerta v{} ===", env!("CARGO_PKG_VERSION"));
    run(cli).await?;

    Ok(())
}
