mod app;
mod cli;
mod http;
mod paths;
mod record;
mod storage;
mod store;
mod subs;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
