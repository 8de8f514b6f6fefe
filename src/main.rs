use clap::Parser;
use coinflow::cli::{Cli, Commands};
use coinflow::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = coinflow::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting price aggregation daemon");
            args.execute(&config).await?;
        }
        Commands::Price(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Pairs: {}", config.aggregator.pairs.join(", "));
            println!(
                "  Aggregation: every {}s, fetch timeout {}s",
                config.aggregator.interval_secs, config.aggregator.fetch_timeout_secs
            );
            println!(
                "  Sources: binance={}, huobi={}",
                config.sources.binance.enabled, config.sources.huobi.enabled
            );
            println!(
                "  Trading: quote={}, stale after {}s, auto-create wallets={}",
                config.trading.quote_currency,
                config.trading.stale_price_threshold_secs,
                config.trading.auto_create_wallets
            );
        }
    }

    Ok(())
}
