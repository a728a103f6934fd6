mod config;
mod main_lib;
mod output;

use std::process::ExitCode;

use clap::Parser;
use markets_sdk::{AssetType, FetchContext, Quote};

use config::Config;
use main_lib::{build_client, init_tracing};

#[derive(Parser)]
#[command(name = "markets")]
#[command(about = "Fetch the latest crypto or stock quote")]
struct Cli {
    /// Asset type to query: crypto or stock
    #[arg(short, long)]
    provider: AssetType,

    /// Symbol to fetch (e.g. bitcoin, AAPL)
    #[arg(short, long)]
    symbol: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env();

    println!("{}", output::fetching(&cli.symbol));

    match fetch(&cli, &config).await {
        Ok(quote) => {
            println!("{}", output::render_quote(&quote));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", output::failure(&e));
            ExitCode::FAILURE
        }
    }
}

async fn fetch(cli: &Cli, config: &Config) -> anyhow::Result<Quote> {
    let client = build_client(config)?;
    let ctx = FetchContext::new().with_timeout(config.request_timeout);

    let quote = client
        .fetch(&ctx, cli.provider.provider_key(), &cli.symbol)
        .await?;
    Ok(quote)
}
