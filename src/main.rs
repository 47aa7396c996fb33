use std::env;

use dotenv::dotenv;
use log::info;
use rusty_http::config::Config;
use rusty_http::server::Server;
use simplelog::SimpleLogger;

const DEFAULT_HOST: &str = "0.0.0.0";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    let mut config = Config::from_env()?;
    if let Some(port) = env::args().nth(1) {
        config = config.with_port(port.parse()?);
    }

    SimpleLogger::init(config.log_level(), simplelog::Config::default())?;
    info!("Serving static files from {:?}", config.static_dir());

    let listening = Server::builder()
        .with_host(DEFAULT_HOST)
        .with_config(config)
        .build()?
        .bind()
        .await?;

    let shutdown = listening.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.stop();
        }
    });

    listening.run().await?;
    Ok(())
}
