//! Clause form of match facts.
//!
//! One match per clause, arguments in fixed order:
//!
//! ```text
//! match(Id, 'round', 'date', 'home', HomeHT, HomeFT, 'away', AwayHT, AwayFT).
//! ```
//!
//! Quoted atoms use single quotes and `\` escapes. `%` starts a comment that
//! runs to the end of the line.

use crate::facts::{Match, DATE_FORMAT};
use std::fmt;

/// Name of the clause holding one match
pub const CLAUSE: &str = "match";

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        for c in self.0.chars() {
            if c == '\'' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("'")
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CLAUSE}({}, {}, {}, {}, {}, {}, {}, {}, {}).",
            self.id,
            Quoted(&self.round),
            Quoted(&self.date.format(DATE_FORMAT).to_string()),
            Quoted(&self.home_team),
            self.home_halftime_goals,
            self.home_fulltime_goals,
            Quoted(&self.away_team),
            self.away_halftime_goals,
            self.away_fulltime_goals,
        )
    }
}

#[cfg(feature = "parsing")]
pub use parser::parse_facts;

#[cfg(feature = "parsing")]
mod parser {
    use super::CLAUSE;
    use crate::error::{LeagueError, Result, ValidationIssue};
    use crate::facts::MatchRecord;
    use nom::{
        branch::alt,
        bytes::complete::{escaped_transform, is_not, tag},
        character::complete::{char, i64 as goals, multispace1, not_line_ending, u64 as match_id},
        combinator::{all_consuming, map, opt, value},
        multi::many0,
        sequence::{delimited, pair, preceded, terminated, tuple},
        Finish, IResult,
    };

    /// Whitespace and `%` comments
    fn ws(input: &str) -> IResult<&str, ()> {
        value(
            (),
            many0(alt((
                value((), multispace1),
                value((), pair(char('%'), not_line_ending)),
            ))),
        )(input)
    }

    fn comma(input: &str) -> IResult<&str, ()> {
        value((), tuple((ws, char(','), ws)))(input)
    }

    fn quoted(input: &str) -> IResult<&str, String> {
        delimited(
            char('\''),
            map(
                opt(escaped_transform(
                    is_not("\\'"),
                    '\\',
                    alt((value("\\", tag("\\")), value("'", tag("'")))),
                )),
                Option::unwrap_or_default,
            ),
            char('\''),
        )(input)
    }

    fn clause(input: &str) -> IResult<&str, MatchRecord> {
        let (input, _) = tuple((tag(CLAUSE), ws, char('('), ws))(input)?;
        let (input, id) = match_id(input)?;
        let (input, round) = preceded(comma, quoted)(input)?;
        let (input, date) = preceded(comma, quoted)(input)?;
        let (input, home_team) = preceded(comma, quoted)(input)?;
        let (input, home_halftime_goals) = preceded(comma, goals)(input)?;
        let (input, home_fulltime_goals) = preceded(comma, goals)(input)?;
        let (input, away_team) = preceded(comma, quoted)(input)?;
        let (input, away_halftime_goals) = preceded(comma, goals)(input)?;
        let (input, away_fulltime_goals) = preceded(comma, goals)(input)?;
        let (input, _) = tuple((ws, char(')'), ws, char('.')))(input)?;

        Ok((
            input,
            MatchRecord {
                id: Some(id),
                round: Some(round),
                date: Some(date),
                home_team: Some(home_team),
                away_team: Some(away_team),
                home_halftime_goals,
                home_fulltime_goals,
                away_halftime_goals,
                away_fulltime_goals,
            },
        ))
    }

    fn document(input: &str) -> IResult<&str, Vec<MatchRecord>> {
        preceded(ws, many0(terminated(clause, ws)))(input)
    }

    /// Parses any number of match clauses into unvalidated records.
    ///
    /// Values are not checked here beyond their syntax; load the records into
    /// a [`FactStore`](crate::FactStore) to validate them.
    ///
    /// # Errors
    ///
    /// [`LeagueError::Validation`] with [`ValidationIssue::Syntax`] pointing at
    /// the byte offset where parsing stopped. `index` is the number of clauses
    /// read successfully before it.
    pub fn parse_facts(source: &str) -> Result<Vec<MatchRecord>> {
        all_consuming(document)(source)
            .finish()
            .map(|(_, records)| records)
            .map_err(|err| {
                let offset = source.len() - err.input.len();
                let index = document(&source[..offset]).map_or(0, |(_, done)| done.len());
                LeagueError::validation(index, ValidationIssue::Syntax(offset))
            })
    }
}
