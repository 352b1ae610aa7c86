use clap::Parser;
use timeline_cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    timeline_cli::run(Args::parse()).await
}
