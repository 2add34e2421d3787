use anyhow::Context;
use campus::kernel::config::load_api_config;
use campus_indexer::{Cli, connect, run};
use campus_logger::Logger;
use clap::Parser;

#[campus_runtime::main(memory_efficient)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg = load_api_config(Some(&cli.config)).context("Critical: Configuration is malformed")?;
    let erp = connect(&cfg).await?;

    let reports = run(&erp, &cfg, &cli.languages(&cfg)).await?;
    tracing::info!(languages = reports.len(), "Indexing complete");
    Ok(())
}
