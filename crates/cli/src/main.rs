// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bay`: the operator binary. Thin wiring from config to `bay-daemon`;
//! all control-plane logic lives in `bay-engine`/`bay-daemon`.

use clap::{Parser, Subcommand};

use bay_core::Settings;
use bay_storage::Database;

#[derive(Parser)]
#[command(name = "bay", about = "Bay sandbox control plane", version = env!("BUILD_GIT_HASH"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control plane (`bayd`'s entry point, shared here so
    /// operators have one binary to reach for).
    Serve,
    /// Connect to the configured database and run pending migrations,
    /// then exit without starting the server.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Serve => bay_daemon::server::run().await,
        Command::Migrate => {
            let settings = Settings::load()?;
            Database::connect(&settings.database.url).await?;
            tracing::info!("migrations applied");
            Ok(())
        }
    }
}
