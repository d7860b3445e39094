use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use clap::{Parser, Subcommand};
use coinsignal::api::{BithumbClient, BithumbPrivateClient, MarketData};
use coinsignal::config::AppConfig;
use coinsignal::notify::{Notifier, StdoutNotifier, TelegramNotifier};
use coinsignal::portfolio::PortfolioReporter;
use coinsignal::report::{ComposerSettings, ProfileKind, ReportComposer, ReportProfile};
use std::path::PathBuf;
use tokio::time::{interval_at, Duration, Instant};

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

#[derive(Parser)]
#[command(
    name = "coinsignal",
    version,
    about = "Crypto market signal reports for Bithumb",
    propagate_version = true
)]
struct Cli {
    /// Configuration file layered over config/default.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and deliver one report
    Run {
        /// short | long
        #[arg(long, default_value = "short")]
        profile: ProfileKind,

        /// Print to stdout instead of Telegram
        #[arg(long)]
        dry_run: bool,
    },
    /// Short-term report every hour, long-term every day, until Ctrl+C
    Schedule {
        #[arg(long)]
        dry_run: bool,
    },
    /// Value account holdings
    Portfolio {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print ticker statistics for one symbol, or the whole market
    Ticker { symbol: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let market = BithumbClient::new(&config.provider).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Run { profile, dry_run } => {
            let composer = ReportComposer::new(
                market,
                notifier(&config, dry_run)?,
                ComposerSettings::from(&config),
            );
            let report = composer.run(&ReportProfile::for_kind(profile)).await?;
            tracing::info!(
                "✅ {} done: {} section(s), {} failed",
                profile,
                report.sections.len(),
                report.failed_sections()
            );
        }
        Commands::Schedule { dry_run } => {
            let composer = ReportComposer::new(
                market,
                notifier(&config, dry_run)?,
                ComposerSettings::from(&config),
            );
            schedule(&composer).await;
        }
        Commands::Portfolio { dry_run } => {
            let account = BithumbPrivateClient::new(&config.provider, &config.credentials)?;
            let reporter = PortfolioReporter::new(
                account,
                market,
                notifier(&config, dry_run)?,
                config.provider.quote_currency.clone(),
            );
            let digest = reporter.run().await?;
            tracing::info!("✅ Portfolio: {} holding(s)", digest.holdings.len());
        }
        Commands::Ticker { symbol } => {
            let quote = &config.provider.quote_currency;
            let output = match symbol {
                Some(symbol) => {
                    let info = market.price_info(&symbol.to_uppercase(), quote).await?;
                    serde_json::to_string_pretty(&info)?
                }
                None => serde_json::to_string_pretty(&market.snapshot(quote).await?)?,
            };
            println!("{}", output);
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coinsignal=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn notifier(config: &AppConfig, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(StdoutNotifier));
    }

    let timeout = Duration::from_secs(config.provider.request_timeout_secs);
    let telegram = TelegramNotifier::new(&config.telegram, timeout)
        .context("Telegram is not configured; pass --dry-run to print instead")?;
    Ok(Box::new(telegram))
}

async fn schedule<M: MarketData, N: Notifier>(composer: &ReportComposer<M, N>) {
    let short_start = next_boundary(Utc::now(), HOUR_SECS);
    let long_start = next_boundary(Utc::now(), DAY_SECS);
    tracing::info!(
        "Short-term reports from {:?}, long-term from {:?}",
        short_start - Instant::now(),
        long_start - Instant::now()
    );

    let mut hourly = interval_at(short_start, Duration::from_secs(HOUR_SECS));
    hourly.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut daily = interval_at(long_start, Duration::from_secs(DAY_SECS));
    daily.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let short_term = ReportProfile::short_term();
    let long_term = ReportProfile::long_term();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!("Press Ctrl+C to stop...");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
            _ = hourly.tick() => {
                if let Err(e) = composer.run(&short_term).await {
                    tracing::error!("Short-term report failed: {}", e);
                }
            }
            _ = daily.tick() => {
                if let Err(e) = composer.run(&long_term).await {
                    tracing::error!("Long-term report failed: {}", e);
                }
            }
        }
    }
}

/// Instant of the next UTC boundary that is a multiple of `period_secs`
fn next_boundary(now: DateTime<Utc>, period_secs: u64) -> Instant {
    let day_secs = now.num_seconds_from_midnight() as u64;
    let wait = period_secs - (day_secs % period_secs);
    let wait = ChronoDuration::seconds(wait as i64) - ChronoDuration::nanoseconds(now.nanosecond() as i64);

    Instant::now() + wait.to_std().unwrap_or_default()
}
