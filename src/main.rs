use anyhow::Result;
use clap::Parser;
use glledger::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    glledger::telemetry::init(cli.verbose, cli.log_format);
    cli.run().await
}
