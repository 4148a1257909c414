use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use listing_net_report::domain::{parse_percent, FeeCalculator, FeeRates, ProductCollection};
use listing_net_report::infra::{HttpImageSource, ListingFetcher};
use listing_net_report::report::{ReportOptions, ReportRenderer};
use listing_net_report::util::assets::EmbeddedAssets;
use listing_net_report::util::settings::{load_settings, save_settings, settings_file, Settings};
use listing_net_report::util::version::{version_label, APP_NAME};

#[derive(Parser)]
#[command(name = "listing-net-report", version, about)]
struct Cli {
    /// Log layout and network decisions.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one listing and print its fee breakdown.
    Estimate {
        url: String,
        #[command(flatten)]
        rates: RateArgs,
    },
    /// Fetch listings and write the PDF analysis.
    Report(ReportArgs),
    /// Inspect or create the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Args)]
struct RateArgs {
    /// Tax rate in percent (`12.5` or `12,5`).
    #[arg(long, value_parser = parse_rate)]
    tax: Option<Decimal>,
    /// Partner commission in percent.
    #[arg(long, value_parser = parse_rate)]
    commission: Option<Decimal>,
}

impl RateArgs {
    fn resolve(&self, settings: &Settings) -> Result<FeeRates> {
        let rates = FeeRates::new(
            self.tax.unwrap_or(settings.tax_rate_pct),
            self.commission.unwrap_or(settings.partner_commission_pct),
        )?;
        Ok(rates)
    }
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    client: String,
    #[command(flatten)]
    rates: RateArgs,
    /// Add listing links even when the settings leave them out.
    #[arg(long, overrides_with = "no_links")]
    links: bool,
    /// Leave listing links out of the PDF.
    #[arg(long, overrides_with = "links")]
    no_links: bool,
    /// JSON file with `[{ "url": ..., "note": ... }]` entries.
    #[arg(long)]
    manifest: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Listing URLs, added after any manifest entries.
    urls: Vec<String>,
}

impl ReportArgs {
    /// Command-line flags win over the settings file; the last flag given wins.
    fn include_links(&self, settings: &Settings) -> bool {
        if self.links {
            true
        } else if self.no_links {
            false
        } else {
            settings.include_links
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    url: String,
    #[serde(default)]
    note: Option<String>,
}

fn parse_rate(input: &str) -> Result<Decimal, String> {
    parse_percent(input).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("{APP_NAME} {} starting", version_label());

    let settings = load_settings();
    match cli.command {
        Command::Estimate { url, rates } => run_estimate(&url, &rates, &settings).await,
        Command::Report(args) => run_report(args, settings).await,
        Command::Config { action } => run_config(action, &settings),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with(stderr_layer)
        .init();
}

async fn run_estimate(url: &str, rates: &RateArgs, settings: &Settings) -> Result<()> {
    let rates = rates.resolve(settings)?;
    let fetcher = ListingFetcher::with_timeout(Duration::from_secs(settings.http_timeout_secs))?;
    let attrs = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("could not load listing {url}"))?;

    let record = FeeCalculator::new()
        .compute(&attrs, rates)
        .with_source_url(url.trim());
    let currency = &settings.currency_symbol;

    println!(
        "Listing type: {} (commission {:.2}% - {:.2}%)",
        record.listing_type.name(),
        record.commission_min,
        record.commission_max
    );
    println!("Fixed fee: {currency} {:.2}", record.fixed_fee);
    for line in record.summary_lines(currency) {
        println!("{}", line.text);
    }
    Ok(())
}

async fn run_report(args: ReportArgs, settings: Settings) -> Result<()> {
    let client = args.client.trim().to_string();
    if client.is_empty() {
        bail!("a client name is required to generate the report");
    }
    let rates = args.rates.resolve(&settings)?;

    let mut entries = match &args.manifest {
        Some(path) => read_manifest(path)?,
        None => Vec::new(),
    };
    entries.extend(args.urls.iter().map(|url| ManifestEntry {
        url: url.clone(),
        note: None,
    }));
    if entries.is_empty() {
        bail!("no listings given; pass URLs or --manifest");
    }

    let timeout = Duration::from_secs(settings.http_timeout_secs);
    let fetcher = ListingFetcher::with_timeout(timeout)?;
    let calculator = FeeCalculator::new();
    let mut products = ProductCollection::new();

    for entry in entries {
        match fetcher.fetch(&entry.url).await {
            Ok(attrs) => {
                let record = calculator
                    .compute(&attrs, rates)
                    .with_source_url(entry.url.trim())
                    .with_note(entry.note.unwrap_or_default());
                products.push(record);
            }
            Err(err) => warn!(url = %entry.url, error = %err, "skipping listing"),
        }
    }
    if products.is_empty() {
        bail!("none of the listings could be loaded");
    }

    for label in products.labels(&settings.currency_symbol) {
        println!("{label}");
    }

    let records = products.records();
    let options = ReportOptions {
        client_name: client.clone(),
        include_links: args.include_links(&settings),
        agency_name: settings.agency_name.clone(),
        currency: settings.currency_symbol.clone(),
        generated_on: Some(OffsetDateTime::now_utc().date()),
    };

    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let images = HttpImageSource::with_timeout(timeout)?;
        let renderer = ReportRenderer::new(&EmbeddedAssets, &images);
        Ok(renderer.render(&records, &options)?)
    })
    .await
    .context("report rendering task failed")??;

    let output = args.output.unwrap_or_else(|| default_output(&client));
    fs::write(&output, &bytes)
        .with_context(|| format!("could not write {}", output.display()))?;
    info!(path = %output.display(), products = products.len(), "report written");
    println!("{}", output.display());
    Ok(())
}

fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("could not read manifest {}", path.display()))?;
    let entries = serde_json::from_str(&data)
        .with_context(|| format!("manifest {} is not valid JSON", path.display()))?;
    Ok(entries)
}

fn default_output(client: &str) -> PathBuf {
    PathBuf::from(format!("analysis_{}.pdf", client.replace(' ', "_")))
}

fn run_config(action: ConfigAction, settings: &Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            match settings_file() {
                Some(path) => println!("# {}", path.display()),
                None => println!("# no config directory available"),
            }
            println!("{}", serde_json::to_string_pretty(settings)?);
        }
        ConfigAction::Init => {
            let path = save_settings(settings)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
