use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use pitchlens::analysis::band::Band;
use pitchlens::analysis::normalize::{normalize_with, MetricColumn, ScoreTable};
use pitchlens::analysis::pass_map::vectorize_matching;
use pitchlens::config::AnalysisConfig;
use pitchlens::data::filter::{filtered_indices, EventFilter};
use pitchlens::data::loader::{load_cohort, load_events};
use pitchlens::data::model::{Cohort, EventTable, PassVector};
use pitchlens::reference;
use pitchlens::{SchemaError, ZeroVariancePolicy};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct CommandArgs {
    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Vectorize one player's actions of one type
    PassMap(PassMapArg),
    /// Z-score comparison of a cohort
    Compare(CompareArg),
    /// Summarize an event table
    Inspect(InspectArg),
}

#[derive(Debug, Clone, Args)]
struct PassMapArg {
    /// Event table (.json, .csv, .parquet)
    #[arg(long)]
    events: Option<PathBuf>,
    /// Exact player name as spelled by the provider
    #[arg(long)]
    player: Option<String>,
    /// Exact action type, e.g. "Pass" or "Carry"
    #[arg(long)]
    action_type: Option<String>,
    /// Print at most this many vectors in text mode
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CompareArg {
    /// Cohort file; the built-in Euro 2024 midfielders when absent
    #[arg(long)]
    cohort: Option<PathBuf>,
    /// Name column of the cohort file
    #[arg(long)]
    name_column: Option<String>,
    /// Metrics to compare
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,
    /// Handling of metrics with identical values across the cohort
    #[arg(long, value_enum)]
    zero_variance: Option<PolicyArg>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct InspectArg {
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Reject,
    Zero,
}

impl From<PolicyArg> for ZeroVariancePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reject => ZeroVariancePolicy::Reject,
            PolicyArg::Zero => ZeroVariancePolicy::Zero,
        }
    }
}

impl Mode {
    /// Fold this subcommand's flags into `config`. Flags win over the file.
    fn apply_to(&self, config: &mut AnalysisConfig) {
        match self {
            Mode::PassMap(arg) => {
                if let Some(events) = &arg.events {
                    config.events = Some(events.clone());
                }
                if let Some(player) = &arg.player {
                    config.player = player.clone();
                }
                if let Some(action_type) = &arg.action_type {
                    config.action_type = action_type.clone();
                }
            }
            Mode::Compare(arg) => {
                if let Some(cohort) = &arg.cohort {
                    config.cohort = Some(cohort.clone());
                }
                if let Some(name_column) = &arg.name_column {
                    config.name_column = name_column.clone();
                }
                if !arg.metrics.is_empty() {
                    config.metrics = arg.metrics.clone();
                }
                if let Some(policy) = arg.zero_variance {
                    config.zero_variance = policy.into();
                }
            }
            Mode::Inspect(arg) => {
                if let Some(events) = &arg.events {
                    config.events = Some(events.clone());
                }
            }
        }
    }
}

fn resolve_config(args: &CommandArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    args.mode.apply_to(&mut config);
    Ok(config)
}

pub fn run() -> Result<()> {
    let args = CommandArgs::parse();
    let config = resolve_config(&args)?;
    match &args.mode {
        Mode::PassMap(arg) => run_pass_map(&config, arg.limit, arg.json),
        Mode::Compare(arg) => run_compare(&config, arg.json),
        Mode::Inspect(_) => run_inspect(&config),
    }
}

fn open_events(config: &AnalysisConfig) -> Result<EventTable> {
    let path = config
        .events
        .as_deref()
        .context("no event table given (use --events or the config file)")?;
    load_events(path, &config.pitch)
}

// ---------------------------------------------------------------------------
// pass-map
// ---------------------------------------------------------------------------

fn run_pass_map(config: &AnalysisConfig, limit: Option<usize>, json: bool) -> Result<()> {
    let table = open_events(config)?;
    let filter = config.event_filter();
    let numbered = numbered_vectors(&table, &filter)?;

    if json {
        let vectors: Vec<&PassVector> = numbered.iter().map(|(_, pv)| pv).collect();
        println!("{}", serde_json::to_string_pretty(&vectors)?);
        return Ok(());
    }

    println!("Total events: {}", table.len());
    println!("{} {}: {}", filter.player, filter.action_type, numbered.len());
    if numbered.is_empty() {
        println!("(no matching actions)");
        return Ok(());
    }
    for (row, pv) in numbered.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", format_vector(*row, pv));
    }
    Ok(())
}

/// Every vector paired with the source row it came from.
fn numbered_vectors(
    table: &EventTable,
    filter: &EventFilter,
) -> Result<Vec<(usize, PassVector)>, SchemaError> {
    let vectors = vectorize_matching(&table.events, filter)?;
    Ok(filtered_indices(table, filter).into_iter().zip(vectors).collect())
}

fn format_vector(row: usize, pv: &PassVector) -> String {
    let end = pv.end();
    format!(
        "#{row:<5} {:>3}:{:02}  ({:6.1}, {:5.1}) -> ({:6.1}, {:5.1})  len {:5.1}  {}",
        pv.minute,
        pv.second,
        pv.origin.x,
        pv.origin.y,
        end.x,
        end.y,
        pv.length(),
        pv.outcome.as_deref().unwrap_or("-"),
    )
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CompareReport<'a> {
    entities: &'a [String],
    columns: &'a [MetricColumn],
    bands: Vec<BandedScore<'a>>,
    failures: Vec<String>,
}

#[derive(Serialize)]
struct BandedScore<'a> {
    entity: &'a str,
    metric: &'a str,
    band: Band,
}

fn open_cohort(config: &AnalysisConfig) -> Result<Cohort> {
    match &config.cohort {
        Some(path) => load_cohort(path, &config.name_column),
        None => Ok(Cohort::new(reference::euro_2024_midfielders())?),
    }
}

fn compare_report(table: &ScoreTable) -> CompareReport<'_> {
    CompareReport {
        entities: table.entities(),
        columns: table.columns(),
        bands: table
            .scores()
            .map(|s| BandedScore {
                entity: &s.entity,
                metric: &s.metric,
                band: s.band(),
            })
            .collect(),
        failures: table.failures().iter().map(ToString::to_string).collect(),
    }
}

fn run_compare(config: &AnalysisConfig, json: bool) -> Result<()> {
    let cohort = open_cohort(config)?;
    let table = normalize_with(cohort.entities(), &config.metrics, config.zero_variance)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&compare_report(&table))?);
        return Ok(());
    }

    print_score_table(&table);
    for failure in table.failures() {
        println!("skipped: {failure}");
    }
    Ok(())
}

fn print_score_table(table: &ScoreTable) {
    let name_width = table
        .columns()
        .iter()
        .map(|c| c.metric.chars().count())
        .max()
        .unwrap_or(0);
    for entity in table.entities() {
        println!("{entity}");
        for score in table.profile(entity) {
            println!(
                "  {:<name_width$}  Z = {:6.2} | {}",
                score.metric,
                score.z,
                score.band()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

fn run_inspect(config: &AnalysisConfig) -> Result<()> {
    let table = open_events(config)?;
    println!("Total events: {}", table.len());
    println!("Columns in event data: {}", table.column_names.join(", "));
    println!("Action types:");
    for kind in table.action_types() {
        println!("  {kind}");
    }
    println!("Players:");
    for player in table.players() {
        println!("  {player}");
    }
    Ok(())
}
