use anyhow::Result;
use clap::Parser;
use flightbook::cli::Cli;
use flightbook::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    cli.run().await
}
