use anyhow::Result;
use clap::Parser;
use docchat_cli::{Cli, execute, init_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry("info")?;
    let cli = Cli::parse();
    execute(cli).await
}
