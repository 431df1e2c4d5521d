use crate::facts::{FactStore, Match};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Which side of the fixture a team played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// Listed first in the fact
    Home,
    /// Listed second in the fact
    Away,
}

/// Fulltime result from one team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MatchResult {
    /// Scored strictly more
    Win,
    /// Scored the same
    Draw,
    /// Scored strictly less
    Loss,
}

impl MatchResult {
    /// Classifies a score line as seen by the side scoring `goals_for`.
    #[must_use]
    pub fn from_score(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            Ordering::Greater => Self::Win,
            Ordering::Equal => Self::Draw,
            Ordering::Less => Self::Loss,
        }
    }
}

/// A match seen from one participant, with the home/away asymmetry removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TeamOutcome {
    /// Identifier of the underlying match
    pub match_id: u64,
    /// Side the team played on
    pub side: Side,
    /// Fulltime result for the team
    pub result: MatchResult,
    /// Fulltime goals scored
    pub goals_for: u32,
    /// Fulltime goals conceded
    pub goals_against: u32,
    /// Goals scored by halftime
    pub halftime_goals_for: u32,
    /// Goals conceded by halftime
    pub halftime_goals_against: u32,
}

impl TeamOutcome {
    /// Derives the outcome of `fact` for whoever played on `side`.
    ///
    /// This is the single place where the home/away columns are mapped onto
    /// for/against; every aggregate is built on top of it.
    #[must_use]
    pub fn derive(fact: &Match, side: Side) -> Self {
        let (goals_for, goals_against, halftime_goals_for, halftime_goals_against) = match side {
            Side::Home => (
                fact.home_fulltime_goals,
                fact.away_fulltime_goals,
                fact.home_halftime_goals,
                fact.away_halftime_goals,
            ),
            Side::Away => (
                fact.away_fulltime_goals,
                fact.home_fulltime_goals,
                fact.away_halftime_goals,
                fact.home_halftime_goals,
            ),
        };

        Self {
            match_id: fact.id,
            side,
            result: MatchResult::from_score(goals_for, goals_against),
            goals_for,
            goals_against,
            halftime_goals_for,
            halftime_goals_against,
        }
    }

    /// Fulltime goals scored minus goals conceded
    #[must_use]
    pub fn goal_diff(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

impl Match {
    /// The side `team` (already normalized) played on, if it played at all.
    #[must_use]
    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Outcome of this match for `team`, or `None` if it did not take part.
    #[must_use]
    pub fn outcome_for(&self, team: &str) -> Option<TeamOutcome> {
        self.side_of(team).map(|side| TeamOutcome::derive(self, side))
    }

    /// Fulltime result from the home side's point of view.
    #[must_use]
    pub fn home_result(&self) -> MatchResult {
        MatchResult::from_score(self.home_fulltime_goals, self.away_fulltime_goals)
    }
}

/// Per-team outcome list. Sized for a typical season without spilling.
pub type Outcomes = SmallVec<[TeamOutcome; 32]>;

/// Every outcome of `team` (already normalized), in store order.
#[must_use]
pub fn outcomes(store: &FactStore, team: &str) -> Outcomes {
    store
        .matches_of(team)
        .filter_map(|fact| fact.outcome_for(team))
        .collect()
}
