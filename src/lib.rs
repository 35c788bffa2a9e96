pub mod cli;
pub mod config;
pub mod logging;
pub mod poem;
pub mod providers;
pub mod session;
pub mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::info;

use cli::Cli;
use config::Config;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    // --version is handled by clap: prints to stdout and exits 0.
    let args = Cli::parse();

    let mut cfg = Config::from_env().context("Failed to load configuration")?;
    if args.debug {
        cfg.debug = true;
    }

    logging::init(&cfg);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %cfg.model,
        theme = %cfg.theme,
        "starting quill"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    ui::run(&client, &cfg, args.direct_prompt()).await
}
