use anyhow::Context;
use campus::kernel::config::load_api_config;
use campus_server::{Server, init_logging};

#[campus_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let cfg = load_api_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = init_logging(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
