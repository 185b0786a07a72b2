use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use absearch::app::App;
use absearch::config::{ConfigLoader, CriteriaOverrides};
use absearch::error::AbSearchError;
use absearch::output::{CsvOutput, JsonOutput, OutputMode, TableOutput};
use absearch::providers::build_providers;

#[derive(Parser)]
#[command(name = "absearch")]
#[command(about = "Search antibody vendors and filter results by criteria")]
#[command(version, author)]
struct Cli {
    /// Protein or gene name to search for (e.g. TP53)
    target: String,

    /// Required applications, all must be present (e.g. WB IHC IF)
    #[arg(long, num_args = 1..)]
    applications: Vec<String>,

    /// Monoclonal or Polyclonal
    #[arg(long, num_args = 1..)]
    clonality: Vec<String>,

    /// Accepted host species (Rabbit, Mouse, ...)
    #[arg(long, num_args = 1..)]
    host_species: Vec<String>,

    /// Validated reactivity, any one suffices (default: Human)
    #[arg(long, num_args = 1..)]
    species_reactivity: Vec<String>,

    /// Accepted conjugations (HRP, Alexa488, ...)
    #[arg(long, num_args = 1..)]
    conjugation: Vec<String>,

    #[arg(long)]
    min_citations: Option<u32>,

    /// Maximum price in vendor currency
    #[arg(long)]
    max_price: Option<f64>,

    /// Minimum amount of antibody in micrograms (default: 10)
    #[arg(long)]
    min_amount_ug: Option<f64>,

    /// Provider names: abcam, mock (default: abcam); a `:mode` suffix is ignored
    #[arg(long, num_args = 1..)]
    providers: Vec<String>,

    /// Accepted for compatibility; listings are always fetched as static HTML
    #[arg(long)]
    headless: bool,

    /// Path to a JSON config file (default: ./absearch.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Print JSON instead of a table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Write CSV to the given path
    #[arg(long)]
    csv: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<AbSearchError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AbSearchError) -> u8 {
    match error {
        AbSearchError::ConfigRead(_)
        | AbSearchError::ConfigParse(_)
        | AbSearchError::UnknownProvider(_) => 2,
        AbSearchError::ProviderHttp { .. } | AbSearchError::ProviderStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = match (&cli.csv, cli.json) {
        (Some(path), _) => OutputMode::Csv(path.clone()),
        (None, true) => OutputMode::Json,
        (None, false) => OutputMode::Table,
    };

    let overrides = CriteriaOverrides {
        species_reactivity: cli.species_reactivity,
        host_species: cli.host_species,
        clonality: cli.clonality,
        applications: cli.applications,
        conjugation: cli.conjugation,
        min_citations: cli.min_citations,
        max_price: cli.max_price,
        min_amount_ug: cli.min_amount_ug,
        providers: cli.providers,
        headless: cli.headless,
    };
    let resolved = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    let providers = build_providers(&resolved.providers)?;
    let app = App::new(providers);
    let report = app.search(&cli.target, &resolved.criteria)?;

    match output_mode {
        OutputMode::Json => JsonOutput::print_report(&report).into_diagnostic()?,
        OutputMode::Csv(path) => {
            let path = Utf8PathBuf::from(path);
            CsvOutput::write(&path, &report.entries)?;
            println!("Wrote {} records to {path}", report.entries.len());
        }
        OutputMode::Table => TableOutput::print(&report.entries).into_diagnostic()?,
    }
    Ok(())
}
