use crate::facts::FactStore;
use crate::outcome::{outcomes, MatchResult, TeamOutcome};
use std::cmp::Ordering;

/// Points awarded for a win
pub const POINTS_PER_WIN: usize = 3;
/// Points awarded for a draw
pub const POINTS_PER_DRAW: usize = 1;

/// One row of the league table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TeamStanding {
    /// Normalized team name
    pub team: String,
    /// Matches played
    pub played: usize,
    /// Matches won
    pub won: usize,
    /// Matches drawn
    pub drawn: usize,
    /// Matches lost
    pub lost: usize,
    /// Fulltime goals scored
    pub goals_for: u64,
    /// Fulltime goals conceded
    pub goals_against: u64,
    /// `goals_for - goals_against`
    pub goal_diff: i64,
    /// `3 * won + drawn`
    pub points: usize,
}

impl TeamStanding {
    /// Folds a team's outcomes into its table row.
    #[must_use]
    pub fn from_outcomes<'a, I>(team: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a TeamOutcome>,
    {
        let mut row = Self {
            team: team.into(),
            ..Self::default()
        };

        for outcome in outcomes {
            row.played += 1;
            row.goals_for += u64::from(outcome.goals_for);
            row.goals_against += u64::from(outcome.goals_against);
            row.goal_diff += outcome.goal_diff();
            match outcome.result {
                MatchResult::Win => row.won += 1,
                MatchResult::Draw => row.drawn += 1,
                MatchResult::Loss => row.lost += 1,
            }
        }

        row.points = POINTS_PER_WIN * row.won + POINTS_PER_DRAW * row.drawn;
        row
    }

    /// Table order: points, goal difference, goals scored (all descending),
    /// then team name ascending.
    #[must_use]
    pub fn table_order(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| other.goal_diff.cmp(&self.goal_diff))
            .then_with(|| other.goals_for.cmp(&self.goals_for))
            .then_with(|| self.team.cmp(&other.team))
    }
}

/// League-wide result counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LeagueTotals {
    /// Matches the home side won
    pub home_wins: usize,
    /// Matches the away side won
    pub away_wins: usize,
    /// Matches level at fulltime
    pub draws: usize,
}

/// Read-only folds over a fact store.
///
/// Team arguments are expected to be normalized already. An unknown team is
/// not an error: every count comes back as zero.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    store: &'a FactStore,
}

impl<'a> Aggregator<'a> {
    /// Wraps a store
    #[must_use]
    pub fn new(store: &'a FactStore) -> Self {
        Self { store }
    }

    fn count(&self, team: &str, result: MatchResult) -> usize {
        outcomes(self.store, team)
            .iter()
            .filter(|o| o.result == result)
            .count()
    }

    /// Matches the team took part in
    #[must_use]
    pub fn played(&self, team: &str) -> usize {
        self.store.matches_of(team).count()
    }

    /// Matches won
    #[must_use]
    pub fn won(&self, team: &str) -> usize {
        self.count(team, MatchResult::Win)
    }

    /// Matches drawn
    #[must_use]
    pub fn drawn(&self, team: &str) -> usize {
        self.count(team, MatchResult::Draw)
    }

    /// Matches lost
    #[must_use]
    pub fn lost(&self, team: &str) -> usize {
        self.count(team, MatchResult::Loss)
    }

    /// Fulltime goals scored across all matches
    #[must_use]
    pub fn goals_for(&self, team: &str) -> u64 {
        outcomes(self.store, team)
            .iter()
            .map(|o| u64::from(o.goals_for))
            .sum()
    }

    /// Fulltime goals conceded across all matches
    #[must_use]
    pub fn goals_against(&self, team: &str) -> u64 {
        outcomes(self.store, team)
            .iter()
            .map(|o| u64::from(o.goals_against))
            .sum()
    }

    /// Goals scored minus goals conceded
    #[must_use]
    pub fn goal_diff(&self, team: &str) -> i64 {
        outcomes(self.store, team)
            .iter()
            .map(TeamOutcome::goal_diff)
            .sum()
    }

    /// League points
    #[must_use]
    pub fn points(&self, team: &str) -> usize {
        POINTS_PER_WIN * self.won(team) + POINTS_PER_DRAW * self.drawn(team)
    }

    /// The full table row for one team, computed in a single pass.
    #[must_use]
    pub fn standing(&self, team: &str) -> TeamStanding {
        TeamStanding::from_outcomes(team, &outcomes(self.store, team))
    }

    /// The league table: one row per participant, in [`TeamStanding::table_order`].
    #[must_use]
    pub fn standings(&self) -> Vec<TeamStanding> {
        let mut table: Vec<TeamStanding> =
            self.store.teams().map(|team| self.standing(team)).collect();
        table.sort_by(TeamStanding::table_order);
        table
    }

    /// Home wins, away wins and draws over every match.
    #[must_use]
    pub fn league_totals(&self) -> LeagueTotals {
        self.store
            .all()
            .fold(LeagueTotals::default(), |mut totals, fact| {
                match fact.home_result() {
                    MatchResult::Win => totals.home_wins += 1,
                    MatchResult::Loss => totals.away_wins += 1,
                    MatchResult::Draw => totals.draws += 1,
                }
                totals
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::tests::record;
    use crate::facts::MatchRecord;
    use proptest::prelude::*;

    fn sample_store() -> FactStore {
        FactStore::load(vec![
            record(1, "a", "b", (1, 2, 0, 0)),
            record(2, "b", "c", (0, 1, 0, 1)),
            record(3, "c", "a", (2, 3, 0, 1)),
            record(4, "a", "c", (0, 0, 0, 0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_team_folds() {
        let store = sample_store();
        let agg = Aggregator::new(&store);

        assert_eq!(agg.played("a"), 3);
        assert_eq!(agg.won("a"), 1);
        assert_eq!(agg.drawn("a"), 1);
        assert_eq!(agg.lost("a"), 1);
        assert_eq!(agg.goals_for("a"), 3);
        assert_eq!(agg.goals_against("a"), 3);
        assert_eq!(agg.goal_diff("a"), 0);
        assert_eq!(agg.points("a"), 4);

        let row = agg.standing("c");
        assert_eq!(
            row,
            TeamStanding {
                team: "c".to_string(),
                played: 3,
                won: 1,
                drawn: 2,
                lost: 0,
                goals_for: 4,
                goals_against: 2,
                goal_diff: 2,
                points: 5,
            }
        );
    }

    #[test]
    fn test_unknown_team_is_all_zero() {
        let store = sample_store();
        let agg = Aggregator::new(&store);

        assert_eq!(agg.played("nobody"), 0);
        assert_eq!(agg.points("nobody"), 0);
        assert_eq!(agg.goal_diff("nobody"), 0);
        assert_eq!(
            agg.standing("nobody"),
            TeamStanding {
                team: "nobody".to_string(),
                ..TeamStanding::default()
            }
        );
    }

    #[test]
    fn test_standings_order() {
        let store = sample_store();
        let table = Aggregator::new(&store).standings();

        let teams: Vec<&str> = table.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["c", "a", "b"]);
        assert_eq!(table[2].points, 1);
    }

    #[test]
    fn test_standings_tie_break_uses_goals_for_then_name() {
        // x and y each win by one goal and lose 0-1: same points and goal difference
        let store = FactStore::load(vec![
            record(1, "y", "p", (0, 2, 0, 1)),
            record(2, "x", "q", (0, 3, 0, 2)),
            record(3, "p", "y", (0, 1, 0, 0)),
            record(4, "q", "x", (0, 1, 0, 0)),
            record(5, "m", "n", (0, 0, 0, 0)),
            record(6, "n", "m", (0, 0, 0, 0)),
        ])
        .unwrap();
        let table = Aggregator::new(&store).standings();
        let teams: Vec<&str> = table.iter().map(|r| r.team.as_str()).collect();

        // x scored more than y; m and n are identical so the name decides
        let pos = |name: &str| teams.iter().position(|t| *t == name).unwrap();
        assert!(pos("x") < pos("y"));
        assert!(pos("m") < pos("n"));
    }

    #[test]
    fn test_goal_totals_past_u32() {
        let store = FactStore::load(vec![
            record(1, "a", "b", (0, 3_000_000_000, 0, 0)),
            record(2, "a", "c", (0, 3_000_000_000, 0, 1)),
        ])
        .unwrap();
        let agg = Aggregator::new(&store);

        let row = agg.standing("a");
        assert_eq!(row.goals_for, 6_000_000_000);
        assert_eq!(row.goals_against, 1);
        assert_eq!(row.goal_diff, 5_999_999_999);
        assert_eq!(row.points, 6);
        assert_eq!(agg.goals_for("a"), 6_000_000_000);
        assert_eq!(agg.goal_diff("a"), 5_999_999_999);
        assert_eq!(agg.standing("b").goals_against, 3_000_000_000);
        assert_eq!(agg.standings()[0].team, "a");
    }

    #[test]
    fn test_league_totals() {
        let store = sample_store();
        let totals = Aggregator::new(&store).league_totals();
        assert_eq!(
            totals,
            LeagueTotals {
                home_wins: 2,
                away_wins: 0,
                draws: 2
            }
        );
    }

    #[test]
    fn test_empty_store() {
        let store = FactStore::default();
        let agg = Aggregator::new(&store);
        assert!(agg.standings().is_empty());
        assert_eq!(agg.league_totals(), LeagueTotals::default());
    }

    const TEAMS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    fn arb_records() -> impl Strategy<Value = Vec<MatchRecord>> {
        prop::collection::vec(
            (0..TEAMS.len(), 1..TEAMS.len(), 0i64..4, 0i64..4, 0i64..3, 0i64..3),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (home, offset, hh, ah, h_extra, a_extra))| {
                    let away = (home + offset) % TEAMS.len();
                    record(
                        u64::try_from(i).unwrap(),
                        TEAMS[home],
                        TEAMS[away],
                        (hh, hh + h_extra, ah, ah + a_extra),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_table_rows_are_consistent(records in arb_records()) {
            let store = FactStore::load(records).unwrap();
            let agg = Aggregator::new(&store);

            for row in agg.standings() {
                prop_assert!(row.played > 0);
                prop_assert_eq!(row.points, 3 * row.won + row.drawn);
                prop_assert_eq!(row.played, row.won + row.drawn + row.lost);
                prop_assert_eq!(
                    i128::from(row.goal_diff),
                    i128::from(row.goals_for) - i128::from(row.goals_against)
                );
                prop_assert_eq!(row.points, agg.points(&row.team));
            }

            for team in TEAMS {
                if agg.played(team) == 0 {
                    prop_assert_eq!(agg.points(team), 0);
                    prop_assert!(agg.standings().iter().all(|r| r.team != team));
                }
            }
        }

        #[test]
        fn prop_standings_are_sorted(records in arb_records()) {
            let store = FactStore::load(records).unwrap();
            let table = Aggregator::new(&store).standings();

            for pair in table.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(
                    a.points > b.points || (a.points == b.points && a.goal_diff >= b.goal_diff)
                );
            }
        }

        #[test]
        fn prop_wins_match_league_totals(records in arb_records()) {
            let store = FactStore::load(records).unwrap();
            let agg = Aggregator::new(&store);
            let totals = agg.league_totals();

            let wins: usize = agg.standings().iter().map(|r| r.won).sum();
            let draws: usize = agg.standings().iter().map(|r| r.drawn).sum();
            prop_assert_eq!(wins, totals.home_wins + totals.away_wins);
            prop_assert_eq!(draws, 2 * totals.draws);
            prop_assert_eq!(
                totals.home_wins + totals.away_wins + totals.draws,
                store.len()
            );
        }
    }
}
