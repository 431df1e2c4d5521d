use crate::aggregate::{Aggregator, LeagueTotals, TeamStanding};
use crate::error::{LeagueError, Result};
use crate::facts::{normalize, FactStore, Match, MatchRecord};
use crate::outcome::{outcomes, TeamOutcome};
use crate::predicates::Evaluator;
use indexmap::IndexSet;
use log::{debug, error, info};
use std::sync::{Arc, OnceLock};

/// Everything known about one team, bundled for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TeamSummary {
    /// Table figures
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub standing: TeamStanding,
    /// Matches without conceding
    pub clean_sheets: usize,
    /// Wins after trailing at halftime
    pub comebacks: usize,
}

#[derive(Debug)]
enum State {
    Ready(Arc<FactStore>),
    Unavailable(Option<LeagueError>),
}

/// Public query surface over one immutable fact store snapshot.
///
/// The service is either ready (holding a snapshot) or unavailable (the load
/// failed or never happened), in which case every query fails with
/// [`LeagueError::NotInitialized`]. The service is `Send + Sync`; the standings
/// table is memoized per snapshot and dropped wholesale on [`reload`](Self::reload).
#[derive(Debug)]
pub struct QueryService {
    state: State,
    standings: OnceLock<Vec<TeamStanding>>,
}

impl QueryService {
    /// A ready service over an already loaded store
    #[must_use]
    pub fn new(store: FactStore) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// A ready service over a store shared with other readers
    #[must_use]
    pub fn from_shared(store: Arc<FactStore>) -> Self {
        Self {
            state: State::Ready(store),
            standings: OnceLock::new(),
        }
    }

    /// A service that answers nothing until it is reloaded
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            state: State::Unavailable(None),
            standings: OnceLock::new(),
        }
    }

    /// Loads `records` and returns a ready service, or an unavailable one
    /// that keeps the load error (see [`load_error`](Self::load_error)).
    #[must_use]
    pub fn initialize<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MatchRecord>,
    {
        match FactStore::load(records) {
            Ok(store) => Self::new(store),
            Err(err) => {
                error!("fact store load failed: {err}");
                Self {
                    state: State::Unavailable(Some(err)),
                    standings: OnceLock::new(),
                }
            }
        }
    }

    /// Replaces the snapshot with a fresh load of `records`.
    ///
    /// Derived caches are dropped either way. On failure the service becomes
    /// unavailable; the previous snapshot is not kept.
    ///
    /// # Errors
    ///
    /// Returns the validation error that aborted the load.
    pub fn reload<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = MatchRecord>,
    {
        self.standings = OnceLock::new();
        match FactStore::load(records) {
            Ok(store) => {
                info!("fact store reloaded");
                self.state = State::Ready(Arc::new(store));
                Ok(())
            }
            Err(err) => {
                error!("fact store reload failed: {err}");
                self.state = State::Unavailable(Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Whether queries can be answered
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Why the service is unavailable, if a load failed
    #[must_use]
    pub fn load_error(&self) -> Option<&LeagueError> {
        match &self.state {
            State::Unavailable(cause) => cause.as_ref(),
            State::Ready(_) => None,
        }
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn store(&self) -> Result<&Arc<FactStore>> {
        match &self.state {
            State::Ready(store) => Ok(store),
            State::Unavailable(_) => Err(LeagueError::NotInitialized),
        }
    }

    fn team_name(name: &str) -> Result<String> {
        let team = normalize(name);
        if team.is_empty() {
            return Err(LeagueError::invalid_query("team name is empty"));
        }
        Ok(team)
    }

    /// Every team that played at least one match, in order of first appearance.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn participants(&self) -> Result<IndexSet<String>> {
        Ok(self.store()?.teams().map(str::to_owned).collect())
    }

    /// Whether `name` played at least one match.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable;
    /// [`LeagueError::InvalidQuery`] if the name is blank.
    pub fn participated(&self, name: &str) -> Result<bool> {
        let team = Self::team_name(name)?;
        Ok(self.store()?.contains_team(&team))
    }

    /// The league table, computed once per snapshot.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn standings(&self) -> Result<&[TeamStanding]> {
        let store = self.store()?;
        let table = self.standings.get_or_init(|| {
            debug!("computing standings for {} matches", store.len());
            Aggregator::new(store).standings()
        });
        Ok(table)
    }

    /// Table figures plus special-event counts for one team.
    ///
    /// A team that never played gets an all-zero summary, not an error.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable;
    /// [`LeagueError::InvalidQuery`] if the name is blank.
    pub fn team_summary(&self, name: &str) -> Result<TeamSummary> {
        let team = Self::team_name(name)?;
        let store = self.store()?;
        let eval = Evaluator::new(store);

        debug!("summary for '{team}'");
        Ok(TeamSummary {
            clean_sheets: eval.clean_sheet_count(&team),
            comebacks: eval.comeback_count(&team),
            standing: Aggregator::new(store).standing(&team),
        })
    }

    /// Role-normalized outcomes of one team, in store order.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable;
    /// [`LeagueError::InvalidQuery`] if the name is blank.
    pub fn outcomes(&self, name: &str) -> Result<Vec<TeamOutcome>> {
        let team = Self::team_name(name)?;
        Ok(outcomes(self.store()?, &team).into_vec())
    }

    /// Home wins, away wins and draws.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn league_totals(&self) -> Result<LeagueTotals> {
        Ok(Aggregator::new(self.store()?).league_totals())
    }

    /// Teams with at least one clean sheet.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn teams_with_clean_sheet(&self) -> Result<IndexSet<String>> {
        Ok(Evaluator::new(self.store()?).teams_with_clean_sheet())
    }

    /// Teams with at least one comeback win.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable.
    pub fn teams_with_comeback(&self) -> Result<IndexSet<String>> {
        Ok(Evaluator::new(self.store()?).teams_with_comeback())
    }

    /// Looks a match up by id.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable;
    /// [`LeagueError::NotFound`] if no match has this id.
    pub fn match_by_id(&self, id: u64) -> Result<&Match> {
        self.store()?
            .by_id(id)
            .ok_or(LeagueError::NotFound { id })
    }

    /// Matches with the given round label, in load order.
    ///
    /// # Errors
    ///
    /// [`LeagueError::NotInitialized`] if the service is unavailable;
    /// [`LeagueError::InvalidQuery`] if the label is blank.
    pub fn matches_in_round(&self, round: &str) -> Result<Vec<&Match>> {
        let label = normalize(round);
        if label.is_empty() {
            return Err(LeagueError::invalid_query("round label is empty"));
        }
        Ok(self.store()?.matches_in_round(&label).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::tests::record;
    use crate::outcome::MatchResult;

    fn league() -> QueryService {
        let mut late = record(3, "Tigre", "Quilmes", (1, 1, 0, 2));
        late.round = Some("1st Phase - 2".to_string());
        QueryService::initialize(vec![
            record(1, "A", "B", (0, 2, 1, 1)),
            record(2, "C", "D", (0, 0, 0, 0)),
            late,
        ])
    }

    #[test]
    fn test_comeback_scenario() {
        let service = QueryService::initialize(vec![record(1, "A", "B", (0, 2, 1, 1))]);

        let a = service.team_summary("A").unwrap();
        let b = service.team_summary("B").unwrap();
        assert_eq!(a.comebacks, 1);
        assert_eq!(b.comebacks, 0);
        assert_eq!(a.standing.points, 3);
        assert_eq!(b.standing.points, 0);
    }

    #[test]
    fn test_goalless_scenario() {
        let service = QueryService::initialize(vec![record(2, "C", "D", (0, 0, 0, 0))]);

        let c = service.team_summary("C").unwrap();
        let d = service.team_summary("D").unwrap();
        assert_eq!(c.clean_sheets, 1);
        assert_eq!(d.clean_sheets, 1);
        assert_eq!(c.standing.points, 1);
        assert_eq!(d.standing.points, 1);
        assert_eq!(service.league_totals().unwrap().draws, 1);
        assert_eq!(service.outcomes("c").unwrap()[0].result, MatchResult::Draw);
        assert_eq!(service.outcomes("d").unwrap()[0].result, MatchResult::Draw);
    }

    #[test]
    fn test_match_by_id() {
        let service = league();
        assert_eq!(service.match_by_id(3).unwrap().home_team, "tigre");
        assert_eq!(
            service.match_by_id(9999).unwrap_err(),
            LeagueError::NotFound { id: 9999 }
        );
    }

    #[test]
    fn test_unknown_team_gets_zero_summary() {
        let service = league();
        let summary = service.team_summary("unknownteam").unwrap();
        assert_eq!(summary.standing.team, "unknownteam");
        assert_eq!(summary.standing.played, 0);
        assert_eq!(summary.standing.points, 0);
        assert_eq!(summary.clean_sheets, 0);
        assert_eq!(summary.comebacks, 0);
        assert!(!service.participated("unknownteam").unwrap());
    }

    #[test]
    fn test_team_lookup_is_case_normalized() {
        let service = league();
        assert_eq!(service.team_summary("  TIGRE ").unwrap().standing.played, 1);
        assert!(service.participated("Quilmes").unwrap());
    }

    #[test]
    fn test_invalid_queries() {
        let service = league();
        assert!(matches!(
            service.team_summary("   "),
            Err(LeagueError::InvalidQuery { .. })
        ));
        assert!(matches!(
            service.matches_in_round(""),
            Err(LeagueError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_participants_and_round() {
        let service = league();
        let teams: Vec<String> = service.participants().unwrap().into_iter().collect();
        assert_eq!(teams, vec!["a", "b", "c", "d", "tigre", "quilmes"]);

        let ids: Vec<u64> = service
            .matches_in_round("1ST PHASE - 1")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(service.matches_in_round("final").unwrap().is_empty());
    }

    #[test]
    fn test_predicate_lists() {
        let service = league();
        let clean: Vec<String> = service.teams_with_clean_sheet().unwrap().into_iter().collect();
        assert_eq!(clean, vec!["c", "d"]);
        let comebacks: Vec<String> = service.teams_with_comeback().unwrap().into_iter().collect();
        assert_eq!(comebacks, vec!["a", "quilmes"]);
    }

    #[test]
    fn test_failed_load_makes_service_unavailable() {
        let service = QueryService::initialize(vec![record(1, "a", "b", (0, -2, 0, 0))]);
        assert!(!service.is_ready());
        assert!(matches!(
            service.load_error(),
            Some(LeagueError::Validation { index: 0, .. })
        ));
        assert_eq!(service.standings().unwrap_err(), LeagueError::NotInitialized);
        assert_eq!(service.participants().unwrap_err(), LeagueError::NotInitialized);
        assert_eq!(service.match_by_id(1).unwrap_err(), LeagueError::NotInitialized);
        assert_eq!(service.team_summary("a").unwrap_err(), LeagueError::NotInitialized);

        let never_loaded = QueryService::unavailable();
        assert!(never_loaded.load_error().is_none());
        assert_eq!(never_loaded.league_totals().unwrap_err(), LeagueError::NotInitialized);
    }

    #[test]
    fn test_reload_invalidates_cached_standings() {
        let mut service = league();
        assert_eq!(service.standings().unwrap().len(), 6);

        service.reload(vec![record(10, "x", "y", (0, 1, 0, 0))]).unwrap();
        let table = service.standings().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].team, "x");

        let err = service
            .reload(vec![MatchRecord::default()])
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation { index: 0, .. }));
        assert!(!service.is_ready());
        assert_eq!(service.standings().unwrap_err(), LeagueError::NotInitialized);
    }

    #[test]
    fn test_empty_store_is_ready() {
        let service = QueryService::initialize(Vec::new());
        assert!(service.is_ready());
        assert!(service.participants().unwrap().is_empty());
        assert!(service.standings().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let service = league();
        let first = service.standings().unwrap().to_vec();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(service.standings().unwrap(), first.as_slice());
                    assert_eq!(service.league_totals().unwrap().home_wins, 1);
                });
            }
        });
    }
}
