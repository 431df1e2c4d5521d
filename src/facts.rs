use crate::error::{LeagueError, Result, ValidationIssue};
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{info, warn};
use smallvec::SmallVec;

/// Date format of match facts (ISO calendar day).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lower-cases and trims a team name or round label.
///
/// Every textual fact value goes through this at load time, so lookups must
/// use it as well or they will never match.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A match result as supplied by an ingestion collaborator, before validation.
///
/// Fields that the store requires are optional here so that a missing value
/// is reported as a [`ValidationIssue`] instead of being impossible to express.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRecord {
    /// Unique match identifier
    pub id: Option<u64>,
    /// Free text round label (e.g. `"1st phase - 3"`)
    pub round: Option<String>,
    /// ISO day (`YYYY-MM-DD`)
    pub date: Option<String>,
    /// Home team name
    pub home_team: Option<String>,
    /// Away team name
    pub away_team: Option<String>,
    /// Home goals at halftime
    pub home_halftime_goals: i64,
    /// Home goals at fulltime
    pub home_fulltime_goals: i64,
    /// Away goals at halftime
    pub away_halftime_goals: i64,
    /// Away goals at fulltime
    pub away_fulltime_goals: i64,
}

/// A validated, normalized match fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Match {
    /// Unique match identifier
    pub id: u64,
    /// Normalized round label
    pub round: String,
    /// Calendar day the match was played
    pub date: NaiveDate,
    /// Normalized home team name
    pub home_team: String,
    /// Normalized away team name
    pub away_team: String,
    /// Home goals at halftime
    pub home_halftime_goals: u32,
    /// Home goals at fulltime
    pub home_fulltime_goals: u32,
    /// Away goals at halftime
    pub away_halftime_goals: u32,
    /// Away goals at fulltime
    pub away_fulltime_goals: u32,
}

impl Match {
    /// Validates and normalizes a record. `index` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueError::Validation`] if a required field is missing or
    /// blank, the date is not an ISO day, or a goal count is negative.
    pub fn from_record(index: usize, record: MatchRecord) -> Result<Self> {
        let fail = |reason| LeagueError::validation(index, reason);

        let id = record.id.ok_or_else(|| fail(ValidationIssue::MissingId))?;
        let round = required_text(record.round.as_deref())
            .ok_or_else(|| fail(ValidationIssue::MissingRound))?;
        let home_team = required_text(record.home_team.as_deref())
            .ok_or_else(|| fail(ValidationIssue::MissingTeam("home")))?;
        let away_team = required_text(record.away_team.as_deref())
            .ok_or_else(|| fail(ValidationIssue::MissingTeam("away")))?;

        let raw_date = record
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| fail(ValidationIssue::MissingDate))?;
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| fail(ValidationIssue::MalformedDate(raw_date.to_string())))?;

        let goals = |field: &'static str, value: i64| -> Result<u32> {
            if value < 0 {
                return Err(fail(ValidationIssue::NegativeGoals { field, value }));
            }
            u32::try_from(value).map_err(|_| fail(ValidationIssue::GoalsOutOfRange { field, value }))
        };

        Ok(Self {
            id,
            round,
            date,
            home_team,
            away_team,
            home_halftime_goals: goals("home_halftime_goals", record.home_halftime_goals)?,
            home_fulltime_goals: goals("home_fulltime_goals", record.home_fulltime_goals)?,
            away_halftime_goals: goals("away_halftime_goals", record.away_halftime_goals)?,
            away_fulltime_goals: goals("away_fulltime_goals", record.away_fulltime_goals)?,
        })
    }

    /// Whether `team` (already normalized) played in this match.
    #[must_use]
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Converts back into the unvalidated record shape.
    #[must_use]
    pub fn to_record(&self) -> MatchRecord {
        MatchRecord {
            id: Some(self.id),
            round: Some(self.round.clone()),
            date: Some(self.date.format(DATE_FORMAT).to_string()),
            home_team: Some(self.home_team.clone()),
            away_team: Some(self.away_team.clone()),
            home_halftime_goals: i64::from(self.home_halftime_goals),
            home_fulltime_goals: i64::from(self.home_fulltime_goals),
            away_halftime_goals: i64::from(self.away_halftime_goals),
            away_fulltime_goals: i64::from(self.away_fulltime_goals),
        }
    }
}

fn required_text(value: Option<&str>) -> Option<String> {
    value.map(normalize).filter(|v| !v.is_empty())
}

/// Positions into the store's match list for one key, in insertion order.
type Positions = SmallVec<[usize; 32]>;

/// Write-once store of validated match facts.
///
/// Matches keep their insertion order. Secondary indexes by team and by round
/// point back into that order, so every per-team or per-round scan sees
/// matches in the order they were loaded.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    matches: IndexMap<u64, Match>,
    /// Team name -> positions of its matches; keys in order of first appearance
    by_team: IndexMap<String, Positions>,
    /// Round label -> positions of its matches
    by_round: IndexMap<String, Positions>,
}

impl FactStore {
    /// Validates every record and builds the store.
    ///
    /// The load is all or nothing: the first bad record aborts it and no
    /// store is produced.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueError::Validation`] for the first malformed record or
    /// for a repeated match id.
    pub fn load<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = MatchRecord>,
    {
        let mut store = Self::default();

        for (index, record) in records.into_iter().enumerate() {
            let fact = Match::from_record(index, record)?;

            if fact.home_team == fact.away_team {
                warn!("match {} has '{}' on both sides", fact.id, fact.home_team);
            }
            if fact.home_halftime_goals > fact.home_fulltime_goals
                || fact.away_halftime_goals > fact.away_fulltime_goals
            {
                warn!("match {} has more halftime than fulltime goals", fact.id);
            }

            store.insert(index, fact)?;
        }

        info!(
            "loaded {} matches across {} teams",
            store.matches.len(),
            store.by_team.len()
        );
        Ok(store)
    }

    fn insert(&mut self, index: usize, fact: Match) -> Result<()> {
        if self.matches.contains_key(&fact.id) {
            return Err(LeagueError::validation(
                index,
                ValidationIssue::DuplicateId(fact.id),
            ));
        }

        let position = self.matches.len();
        self.by_team
            .entry(fact.home_team.clone())
            .or_default()
            .push(position);
        if fact.away_team != fact.home_team {
            self.by_team
                .entry(fact.away_team.clone())
                .or_default()
                .push(position);
        }
        self.by_round
            .entry(fact.round.clone())
            .or_default()
            .push(position);
        self.matches.insert(fact.id, fact);
        Ok(())
    }

    /// Number of stored matches
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether the store holds no matches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// All matches in insertion order
    pub fn all(&self) -> impl ExactSizeIterator<Item = &Match> + '_ {
        self.matches.values()
    }

    /// Looks a match up by its identifier.
    #[must_use]
    pub fn by_id(&self, id: u64) -> Option<&Match> {
        self.matches.get(&id)
    }

    /// Every team that appears as home or away, in order of first appearance.
    pub fn teams(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.by_team.keys().map(String::as_str)
    }

    /// Whether `team` (already normalized) appears in at least one match.
    #[must_use]
    pub fn contains_team(&self, team: &str) -> bool {
        self.by_team.contains_key(team)
    }

    /// Matches `team` (already normalized) played, in insertion order.
    pub fn matches_of<'a>(&'a self, team: &str) -> impl Iterator<Item = &'a Match> + 'a {
        self.resolve(self.by_team.get(team))
    }

    /// Matches with the given (already normalized) round label, in insertion order.
    pub fn matches_in_round<'a>(&'a self, round: &str) -> impl Iterator<Item = &'a Match> + 'a {
        self.resolve(self.by_round.get(round))
    }

    fn resolve<'a>(
        &'a self,
        positions: Option<&'a Positions>,
    ) -> impl Iterator<Item = &'a Match> + 'a {
        positions
            .into_iter()
            .flatten()
            .filter_map(|&pos| self.matches.get_index(pos).map(|(_, fact)| fact))
    }
}
