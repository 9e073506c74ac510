use clap::Parser;
use github_keys::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cli::sync::run(cli).await
}
