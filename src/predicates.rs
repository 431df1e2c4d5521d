use crate::facts::FactStore;
use crate::outcome::{outcomes, Side, TeamOutcome};
use indexmap::IndexSet;

/// Qualitative per-match events that can be counted for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecialPredicate {
    /// Conceded nothing at fulltime
    CleanSheet,
    /// Trailed at halftime, won at fulltime
    Comeback,
}

impl SpecialPredicate {
    /// Whether the event happened in this outcome.
    #[must_use]
    pub fn holds(self, outcome: &TeamOutcome) -> bool {
        match self {
            Self::CleanSheet => outcome.goals_against == 0,
            Self::Comeback => {
                outcome.halftime_goals_for < outcome.halftime_goals_against
                    && outcome.goals_for > outcome.goals_against
            }
        }
    }
}

/// Counts special events per team and lists the teams they apply to.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    store: &'a FactStore,
}

impl<'a> Evaluator<'a> {
    /// Wraps a store
    #[must_use]
    pub fn new(store: &'a FactStore) -> Self {
        Self { store }
    }

    /// Matches of `team` in which `predicate` holds.
    #[must_use]
    pub fn count(&self, predicate: SpecialPredicate, team: &str) -> usize {
        outcomes(self.store, team)
            .iter()
            .filter(|o| predicate.holds(o))
            .count()
    }

    /// Matches in which `team` conceded no goals
    #[must_use]
    pub fn clean_sheet_count(&self, team: &str) -> usize {
        self.count(SpecialPredicate::CleanSheet, team)
    }

    /// Matches `team` won after trailing at halftime
    #[must_use]
    pub fn comeback_count(&self, team: &str) -> usize {
        self.count(SpecialPredicate::Comeback, team)
    }

    /// Teams for which `predicate` held at least once.
    ///
    /// Matches are scanned once from the home role and once from the away
    /// role; the two hit lists are unioned so a team found by both scans
    /// appears once, at its first hit.
    #[must_use]
    pub fn teams_where(&self, predicate: SpecialPredicate) -> IndexSet<String> {
        let mut teams = self.scan(predicate, Side::Home);
        teams.extend(self.scan(predicate, Side::Away));
        teams
    }

    fn scan(&self, predicate: SpecialPredicate, side: Side) -> IndexSet<String> {
        self.store
            .all()
            .filter(|fact| predicate.holds(&TeamOutcome::derive(fact, side)))
            .map(|fact| match side {
                Side::Home => fact.home_team.clone(),
                Side::Away => fact.away_team.clone(),
            })
            .collect()
    }

    /// Teams with at least one clean sheet
    #[must_use]
    pub fn teams_with_clean_sheet(&self) -> IndexSet<String> {
        self.teams_where(SpecialPredicate::CleanSheet)
    }

    /// Teams with at least one comeback win
    #[must_use]
    pub fn teams_with_comeback(&self) -> IndexSet<String> {
        self.teams_where(SpecialPredicate::Comeback)
    }
}
