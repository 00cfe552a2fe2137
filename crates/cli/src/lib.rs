use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::AppConfig;
use rackguard_ingest::{export_report, CsvLoader};
use rackguard_netbox::NetBoxClient;
use rackguard_snapshot::{FileSource, Snapshot, SnapshotCache, SnapshotSource};
use rackguard_validator::{
    Classifier, ClassifierConfig, InputRow, NamingRule, Report, ReportFilter, ValidationPass,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod output;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "rackguard")]
#[command(about = "Validate planned rack placements against NetBox", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./rackguard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every row of a placement CSV
    Validate(ValidateArgs),

    /// List racks of a facility with their occupancy
    Racks(RacksArgs),

    /// Check NetBox reachability and report its version
    #[command(name = "check-connection")]
    CheckConnection,
}

#[derive(Args)]
struct SourceArgs {
    /// NetBox site slug or id (overrides config and NETBOX_SITE)
    #[arg(long)]
    site: Option<String>,

    /// Read inventory from a JSON snapshot file instead of NetBox
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Placement CSV to validate
    csv: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// Device naming pattern (regex, anchored at the start of the name)
    #[arg(long)]
    naming_pattern: Option<String>,

    /// Write results to this file (.json for JSON, CSV otherwise)
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Subset of results to list and export
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RacksArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    All,
    ReadyToImport,
    NeedsData,
    Available,
    Blocked,
}

impl From<FilterArg> for ReportFilter {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::All => ReportFilter::All,
            FilterArg::ReadyToImport => ReportFilter::ReadyToImport,
            FilterArg::NeedsData => ReportFilter::NeedsData,
            FilterArg::Available => ReportFilter::Available,
            FilterArg::Blocked => ReportFilter::Blocked,
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let json_output = match &cli.command {
        Commands::Validate(args) => args.json,
        Commands::Racks(args) => args.json,
        Commands::CheckConnection => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env();

    match cli.command {
        Commands::Validate(args) => run_validate(args, &config).await?,
        Commands::Racks(args) => run_racks(args, &config).await?,
        Commands::CheckConnection => run_check_connection(&config).await?,
    }

    Ok(())
}

async fn load_snapshot(source: &SourceArgs, config: &AppConfig) -> Result<Arc<Snapshot>> {
    let backend: Arc<dyn SnapshotSource>;
    let facility = match &source.snapshot {
        Some(path) => {
            log::info!("Using snapshot file {}", path.display());
            backend = Arc::new(FileSource::new(path));
            source.site.clone().unwrap_or_default()
        }
        None => {
            backend = Arc::new(netbox_client(config)?);
            source
                .site
                .clone()
                .or_else(|| config.netbox.site.clone())
                .context("No site given; pass --site, set NETBOX_SITE or [netbox] site")?
        }
    };

    let cache = SnapshotCache::new(backend);
    let snapshot = cache
        .refresh(&facility)
        .await
        .context("Failed to load inventory snapshot")?;
    Ok(snapshot)
}

fn netbox_client(config: &AppConfig) -> Result<NetBoxClient> {
    let netbox = config.netbox_config();
    if !netbox.is_configured() {
        anyhow::bail!(
            "NetBox is not configured; set [netbox] url and token, \
             NETBOX_URL and NETBOX_TOKEN, or use --snapshot"
        );
    }
    NetBoxClient::new(netbox).context("Failed to build NetBox client")
}

async fn run_validate(args: ValidateArgs, config: &AppConfig) -> Result<()> {
    let snapshot = load_snapshot(&args.source, config).await?;

    let loaded = CsvLoader::new()
        .load_path(&args.csv)
        .with_context(|| format!("Failed to load {}", args.csv.display()))?;
    for warning in &loaded.warnings {
        log::warn!("{}: {warning}", args.csv.display());
    }

    let pattern = args
        .naming_pattern
        .as_deref()
        .or(config.validation.naming_pattern.as_deref());
    let naming = NamingRule::from_option(pattern).context("Invalid naming pattern")?;
    let default_facility = config
        .validation
        .default_facility
        .clone()
        .or_else(|| Some(snapshot.facility().to_string()))
        .filter(|facility| !facility.trim().is_empty());

    let classifier = Classifier::new(ClassifierConfig {
        naming,
        default_facility,
    });
    let report = run_pass(ValidationPass::new(classifier, snapshot), loaded.rows).await?;

    let filter = ReportFilter::from(args.filter);
    if let Some(path) = &args.export {
        let written = export_report(&report, filter, path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        log::info!("Wrote {written} result(s) to {}", path.display());
    }

    if args.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        print_stdout(&json)?;
    } else {
        print_stdout(&output::render_report(&report, &report.filtered(filter)))?;
    }
    Ok(())
}

/// Run the CPU-bound pass off the async runtime; Ctrl-C cancels it.
async fn run_pass(pass: ValidationPass, rows: Vec<InputRow>) -> Result<Report> {
    let cancel = pass.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; cancelling validation pass");
            cancel.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || pass.run(&rows))
        .await
        .context("Validation task failed")?;
    interrupt.abort();
    outcome.context("Validation pass failed")
}

async fn run_racks(args: RacksArgs, config: &AppConfig) -> Result<()> {
    let snapshot = load_snapshot(&args.source, config).await?;
    let racks = output::rack_summaries(&snapshot);

    if args.json {
        let mut json = serde_json::to_string_pretty(&racks)?;
        json.push('\n');
        print_stdout(&json)?;
    } else {
        print_stdout(&output::render_racks(&snapshot, &racks))?;
    }
    Ok(())
}

async fn run_check_connection(config: &AppConfig) -> Result<()> {
    let client = netbox_client(config)?;
    let version = client
        .test_connection()
        .await
        .with_context(|| format!("Failed to reach NetBox at {}", client.config().url))?;
    print_stdout(&format!(
        "Connected to NetBox {version} at {}\n",
        client.config().url
    ))?;
    Ok(())
}
