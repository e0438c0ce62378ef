use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use taxochem::app::{App, build_resolver};
use taxochem::config::ConfigLoader;
use taxochem::domain::TaxonId;
use taxochem::error::TaxochemError;
use taxochem::output::{HumanOutput, JsonOutput, OutputMode};
use taxochem::store::ResultStore;
use taxochem::wikidata::WikidataClient;

#[derive(Parser)]
#[command(name = "taxochem")]
#[command(about = "Enrich taxon lists with natural-product occurrence statistics")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resolve, aggregate and merge as described by a run file")]
    Run(RunArgs),
    #[command(about = "List Wikidata species under a genus Q-code")]
    Species(SpeciesArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    config: Option<String>,
}

#[derive(Args)]
struct SpeciesArgs {
    genus: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<TaxochemError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TaxochemError) -> u8 {
    match error {
        TaxochemError::DataLoad { .. } | TaxochemError::MissingColumn { .. } => 2,
        TaxochemError::ResolverHttp(_)
        | TaxochemError::ResolverStatus { .. }
        | TaxochemError::ResolverResponse(_) => 3,
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
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Commands::Run(args) => run_pipeline(args, output_mode),
        Commands::Species(args) => run_species(args, output_mode),
    }
}

fn run_pipeline(args: RunArgs, output_mode: OutputMode) -> miette::Result<()> {
    let config = ConfigLoader::resolve(args.config.as_deref())?;
    let resolver = build_resolver(&config)?;
    let app = App::new(ResultStore::new(Utf8PathBuf::from(&config.output_dir)), resolver);
    match output_mode {
        OutputMode::Json => {
            let report = app.run(&config, &JsonOutput)?;
            JsonOutput::print_report(&report).into_diagnostic()?;
        }
        OutputMode::Human => {
            let report = app.run(&config, &HumanOutput)?;
            HumanOutput::print_report(&report).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_species(args: SpeciesArgs, output_mode: OutputMode) -> miette::Result<()> {
    let genus: TaxonId = args.genus.parse()?;
    let species = WikidataClient::new()?.species_in_genus(&genus)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_species(&species).into_diagnostic()?,
        OutputMode::Human => HumanOutput::print_species(&species).into_diagnostic()?,
    }
    Ok(())
}
