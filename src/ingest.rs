//! Reader for the third-party fixtures document.
//!
//! The document wraps a list of fixtures in a `response` key. Each fixture is
//! flattened into a [`MatchRecord`]; unknown keys are ignored.

use crate::facts::MatchRecord;
use anyhow::Context;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixture {
    fixture: FixtureInfo,
    league: LeagueInfo,
    teams: Sides<TeamInfo>,
    goals: Sides<Option<i64>>,
    score: Score,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureInfo {
    id: Option<u64>,
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LeagueInfo {
    round: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamInfo {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Sides<T: Default> {
    home: T,
    away: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Score {
    halftime: Sides<Option<i64>>,
}

impl From<Fixture> for MatchRecord {
    fn from(f: Fixture) -> Self {
        Self {
            id: f.fixture.id,
            round: f.league.round,
            // "2021-02-13T21:30:00+00:00" -> "2021-02-13"
            date: f
                .fixture
                .date
                .map(|d| d.split('T').next().unwrap_or_default().to_string()),
            home_team: f.teams.home.name,
            away_team: f.teams.away.name,
            home_halftime_goals: f.score.halftime.home.unwrap_or(0),
            home_fulltime_goals: f.goals.home.unwrap_or(0),
            away_halftime_goals: f.score.halftime.away.unwrap_or(0),
            away_fulltime_goals: f.goals.away.unwrap_or(0),
        }
    }
}

fn into_records(envelope: Envelope) -> Vec<MatchRecord> {
    let entries = envelope.response.unwrap_or_default();
    if entries.is_empty() {
        warn!("fixtures document has no entries under 'response'");
    }

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Fixture>(entry) {
            Ok(fixture) => Some(MatchRecord::from(fixture)),
            Err(err) => {
                warn!("skipping fixture #{index}: {err}");
                None
            }
        })
        .collect()
}

/// Parses a fixtures document held in memory.
///
/// # Errors
///
/// Fails only if the text is not a JSON object; malformed entries are skipped.
pub fn parse_fixtures(json: &str) -> serde_json::Result<Vec<MatchRecord>> {
    serde_json::from_str(json).map(into_records)
}

/// Parses a fixtures document from a reader.
///
/// # Errors
///
/// Fails on I/O errors or if the input is not a JSON object.
pub fn read_fixtures<R: Read>(reader: R) -> serde_json::Result<Vec<MatchRecord>> {
    serde_json::from_reader(reader).map(into_records)
}

/// Opens and parses a fixtures file.
///
/// # Errors
///
/// Fails if the file cannot be opened or is not a JSON object.
pub fn load_fixtures_file(path: &Path) -> anyhow::Result<Vec<MatchRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records = read_fixtures(BufReader::new(file))
        .with_context(|| format!("decoding fixtures in {}", path.display()))?;
    debug!("read {} fixtures from {}", records.len(), path.display());
    Ok(records)
}
