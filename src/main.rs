use clap::Parser;
use ghcn_weather_api::cli::{run, Cli};
use ghcn_weather_api::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
