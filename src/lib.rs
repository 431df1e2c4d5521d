//! # Fixturelog
//!
//! A fixed-rule standings and statistics engine over football match facts.
//!
//! ## Features
//!
//! - Write-once fact store of validated match results
//! - Role-normalized per-team outcomes (home and away folded into one view)
//! - League table, league-wide totals, clean sheets and comebacks
//! - A query service with a memoized table per loaded snapshot
//!
//! ## Example
//!
//! ```rust
//! use fixturelog::{MatchRecord, QueryService};
//!
//! let service = QueryService::initialize(vec![MatchRecord {
//!     id: Some(1),
//!     round: Some("1st Phase - 1".to_string()),
//!     date: Some("2021-02-13".to_string()),
//!     home_team: Some("Tigre".to_string()),
//!     away_team: Some("Quilmes".to_string()),
//!     home_halftime_goals: 0,
//!     home_fulltime_goals: 2,
//!     away_halftime_goals: 1,
//!     away_fulltime_goals: 1,
//! }]);
//!
//! let tigre = service.team_summary("tigre").unwrap();
//! assert_eq!(tigre.standing.points, 3);
//! assert_eq!(tigre.comebacks, 1);
//! ```

/// League table folds.
pub mod aggregate;
/// Error taxonomy.
pub mod error;
/// Match facts and the fact store.
pub mod facts;
/// Third-party fixtures reader.
#[cfg(feature = "serde")]
pub mod ingest;
/// Per-team view of a match.
pub mod outcome;
/// Clean sheets and comebacks.
pub mod predicates;
/// Public query surface.
pub mod query;
/// Clause form of match facts.
pub mod text;

pub use aggregate::{Aggregator, LeagueTotals, TeamStanding, POINTS_PER_DRAW, POINTS_PER_WIN};
pub use error::{LeagueError, Result, ValidationIssue};
pub use facts::{normalize, FactStore, Match, MatchRecord};
pub use outcome::{MatchResult, Side, TeamOutcome};
pub use predicates::{Evaluator, SpecialPredicate};
pub use query::{QueryService, TeamSummary};
