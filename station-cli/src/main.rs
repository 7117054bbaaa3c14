//! Binary crate for the `weather-station` host front-end.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Driving the update loop the way the device main loop does
//! - Printing published snapshots in place of the display

use clap::Parser;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let cmd = cli::Cli::parse();
    cmd.run().await
}
