//! Fixturelog CLI
//!
//! Loads match facts from a fixtures document, a normalized record array or
//! clause text, and prints the answer to one query.

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use fixturelog::ingest::load_fixtures_file;
use fixturelog::{MatchRecord, QueryService, TeamStanding};
use log::{info, warn, LevelFilter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fixturelog")]
#[command(about = "Standings and statistics over football match facts", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["fixtures", "records", "facts"])))]
struct Cli {
    /// Third-party fixtures document (JSON with a `response` list)
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// JSON array of normalized match records
    #[arg(long)]
    records: Option<PathBuf>,

    /// Match clauses, one `match(...)` per fact
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, default_value = "false")]
    json: bool,

    /// Log at debug level
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full league table
    Standings,
    /// Summary of one team
    Team {
        /// Team name (case-insensitive)
        name: String,
    },
    /// Home wins, away wins and draws
    Stats,
    /// Teams with at least one clean sheet
    CleanSheets,
    /// Teams with at least one comeback win
    Comebacks,
    /// Every team that played
    Participants,
    /// One match by id
    Match {
        /// Match identifier
        id: u64,
    },
    /// Matches of one round
    Round {
        /// Round label (case-insensitive)
        label: String,
    },
}

fn read_records(cli: &Cli) -> Result<Vec<MatchRecord>> {
    if let Some(path) = &cli.fixtures {
        return load_fixtures_file(path);
    }
    if let Some(path) = &cli.records {
        let text = read(path)?;
        return serde_json::from_str(&text)
            .with_context(|| format!("decoding records in {}", path.display()));
    }
    if let Some(path) = &cli.facts {
        return read_facts(path);
    }
    bail!("no input given")
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(feature = "parsing")]
fn read_facts(path: &Path) -> Result<Vec<MatchRecord>> {
    let text = read(path)?;
    fixturelog::text::parse_facts(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(not(feature = "parsing"))]
fn read_facts(path: &Path) -> Result<Vec<MatchRecord>> {
    bail!(
        "{}: clause input needs the `parsing` feature",
        path.display()
    )
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn table(rows: &[TeamStanding]) -> String {
    let mut out = format!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "team", "P", "W", "D", "L", "GF", "GA", "GD", "PTS"
    );
    for (pos, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "\n{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
            pos + 1,
            row.team,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_diff,
            row.points
        ));
    }
    out
}

fn lines<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let service = QueryService::initialize(read_records(&cli)?);
    if let Some(err) = service.load_error() {
        bail!("fact store unavailable: {err}");
    }
    info!("ready");

    match &cli.command {
        Commands::Standings => {
            let rows = service.standings()?;
            emit(cli.json, &rows, || table(rows))?;
        }
        Commands::Team { name } => {
            let summary = service.team_summary(name)?;
            if !service.participated(name)? {
                warn!("'{}' did not play any match", summary.standing.team);
            }
            emit(cli.json, &summary, || {
                format!(
                    "{}\n{}\nclean sheets: {}\ncomebacks: {}",
                    table(std::slice::from_ref(&summary.standing)),
                    "-".repeat(68),
                    summary.clean_sheets,
                    summary.comebacks
                )
            })?;
        }
        Commands::Stats => {
            let totals = service.league_totals()?;
            emit(cli.json, &totals, || {
                format!(
                    "home wins: {}\naway wins: {}\ndraws: {}",
                    totals.home_wins, totals.away_wins, totals.draws
                )
            })?;
        }
        Commands::CleanSheets => {
            let teams = service.teams_with_clean_sheet()?;
            emit(cli.json, &teams, || lines(&teams))?;
        }
        Commands::Comebacks => {
            let teams = service.teams_with_comeback()?;
            emit(cli.json, &teams, || lines(&teams))?;
        }
        Commands::Participants => {
            let teams = service.participants()?;
            emit(cli.json, &teams, || lines(&teams))?;
        }
        Commands::Match { id } => {
            let fact = service.match_by_id(*id)?;
            emit(cli.json, fact, || fact.to_string())?;
        }
        Commands::Round { label } => {
            let facts = service.matches_in_round(label)?;
            emit(cli.json, &facts, || {
                facts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }

    Ok(())
}
