use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use grocery_price_scraper::application::{RunConfig, ScrapeUseCases, normalize_raw_file};
use grocery_price_scraper::domain::Supermarket;
use grocery_price_scraper::infrastructure::{AppConfig, HttpClient, ProductApiClient, logging};

#[derive(Parser, Debug)]
#[command(name = "grocery-price-scraper", version, about = "Supermarket product listing scraper")]
struct Cli {
    /// Config file (TOML/JSON/YAML); defaults to config/scraper.* when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    /// Scrape a retailer's categories and export the products
    Scrape(ScrapeArgs),
    /// Normalize a JSON array of raw product mappings and export it
    Normalize(NormalizeArgs),
    /// List the built-in site profiles
    Sites,
}

#[derive(Debug, Args)]
struct ScrapeArgs {
    /// cold-storage, fairprice or sheng-siong
    #[arg(long)]
    site: Supermarket,
    /// Only the test category, at most 2 pages and 5 products
    #[arg(long)]
    test_mode: bool,
    /// Request an embedding for every product
    #[arg(long)]
    embed: bool,
    /// Upload the products to the backend after export
    #[arg(long)]
    upload: bool,
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    #[arg(long)]
    site: Supermarket,
    /// JSON file with raw product mappings
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init_logging_with_config(&config.logging)?;

    match cli.command {
        Command::Scrape(args) => scrape(&config, args).await,
        Command::Normalize(args) => {
            let output_dir = args.output_dir.unwrap_or_else(|| config.output.directory.clone());
            let (products, paths) = normalize_raw_file(&args.site.profile(), &args.input, &output_dir)?;
            match paths {
                Some(paths) => info!(
                    "Normalized {} products into {} and {}",
                    products.len(),
                    paths.csv.display(),
                    paths.json.display()
                ),
                None => warn!("Nothing to export from {}", args.input.display()),
            }
            Ok(())
        }
        Command::Sites => {
            for market in Supermarket::ALL {
                let profile = market.profile();
                println!(
                    "{:<14} {:<14} {:>3} categories  {}",
                    market.slug(),
                    market.display_name(),
                    profile.category_urls.len(),
                    profile.origin
                );
            }
            Ok(())
        }
    }
}

async fn scrape(config: &AppConfig, args: ScrapeArgs) -> Result<()> {
    let run = RunConfig {
        test_mode: args.test_mode,
        embed: args.embed,
        upload: args.upload,
        output_dir: args.output_dir.unwrap_or_else(|| config.output.directory.clone()),
    };

    let fetcher = Arc::new(HttpClient::new(config.http.clone())?);
    let mut use_cases = ScrapeUseCases::new(args.site.profile(), config.crawl.clone(), fetcher)?;

    if run.embed || run.upload {
        let api = Arc::new(ProductApiClient::from_env(config.api.clone())?);
        use_cases = use_cases.with_embedding_service(api.clone()).with_product_sink(
            api,
            config.api.upload_batch_size,
            Duration::from_millis(config.api.upload_batch_delay_ms),
        );
    }

    let outcome = tokio::select! {
        outcome = use_cases.run(&run) => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!("🛑 Run interrupted");
            return Ok(());
        }
    };

    if let Some(upload) = &outcome.upload {
        if !upload.is_complete() {
            warn!("Upload incomplete, failed batches: {:?}", upload.failed_batches);
        }
    }
    info!(
        "Done: {} products from {} categories",
        outcome.products.len(),
        outcome.categories.len()
    );
    Ok(())
}
