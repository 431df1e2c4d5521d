use thiserror::Error;

/// A specialized `Result` type for league queries and loads.
pub type Result<T> = std::result::Result<T, LeagueError>;

/// Why a single match record was rejected at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The record carries no match identifier.
    #[error("missing match id")]
    MissingId,

    /// Another record in the same load already used this identifier.
    #[error("duplicate match id {0}")]
    DuplicateId(u64),

    /// The home or away team name is missing or blank.
    #[error("missing {0} team")]
    MissingTeam(&'static str),

    /// The round label is missing or blank.
    #[error("missing round label")]
    MissingRound,

    /// The date is missing.
    #[error("missing date")]
    MissingDate,

    /// The date is not an ISO calendar day (`YYYY-MM-DD`).
    #[error("malformed date '{0}'")]
    MalformedDate(String),

    /// A goal count is below zero.
    #[error("negative goal count {value} for {field}")]
    NegativeGoals {
        /// Which of the four goal fields failed.
        field: &'static str,
        /// The offending value.
        value: i64,
    },

    /// A goal count does not fit the fact schema.
    #[error("goal count {value} for {field} is out of range")]
    GoalsOutOfRange {
        /// Which of the four goal fields failed.
        field: &'static str,
        /// The offending value.
        value: i64,
    },

    /// Fact text could not be parsed at the given byte offset.
    #[error("syntax error at byte {0}")]
    Syntax(usize),
}

/// Errors surfaced by the fact store and the query service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeagueError {
    /// A record in the load input is malformed. The whole load is aborted.
    #[error("invalid match record #{index}: {reason}")]
    Validation {
        /// Position of the record in the load input.
        index: usize,
        /// What was wrong with it.
        reason: ValidationIssue,
    },

    /// A query was issued against a service without a loaded fact store.
    #[error("fact store not initialized")]
    NotInitialized,

    /// No match carries the requested identifier.
    #[error("match {id} not found")]
    NotFound {
        /// The identifier that was looked up.
        id: u64,
    },

    /// The query arguments are malformed.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Human readable description of the problem.
        reason: String,
    },
}

impl LeagueError {
    pub(crate) fn validation(index: usize, reason: ValidationIssue) -> Self {
        Self::Validation { index, reason }
    }

    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }
}
