//! Standalone message submission server.
//!
//! Configuration comes from the environment (`MESSAGEMOD_ADDR`,
//! `DATABASE_URL`); ctrl-c triggers a graceful shutdown that closes the
//! store.

use messagemod::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.bind_addr,
        database_url = %config.database_url,
        "starting messagemod server"
    );

    let server = MessageServerBuilder::new()
        .config(config)
        .build(AnonymousAuth)
        .await?;

    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}
