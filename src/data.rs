//! Loading of match histories and league tables from CSV.
//!
//! Match histories are accepted under either of two header conventions: the football-data style
//! (`HomeTeam`, `FTHG`, ...) or the footystats style (`home_team_name`, `home_team_goal_count`,
//! ...). League tables are `;`-separated with `"`-quoted fields.

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Fixture, LeagueTableRow};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column {0}")]
    MissingColumn(&'static str),

    #[error("line {line}: missing value for {column}")]
    MissingValue { line: u64, column: &'static str },

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },
}

const HOME_TEAM: [&str; 2] = ["HomeTeam", "home_team_name"];
const AWAY_TEAM: [&str; 2] = ["AwayTeam", "away_team_name"];
const HOME_GOALS: [&str; 2] = ["FTHG", "home_team_goal_count"];
const AWAY_GOALS: [&str; 2] = ["FTAG", "away_team_goal_count"];
const HOME_XG: [&str; 2] = ["team_a_xg", "home_xg"];
const AWAY_XG: [&str; 2] = ["team_b_xg", "away_xg"];
const DATE: [&str; 4] = ["Date", "date", "DATE", "date_GMT"];

const DATE_FORMATS: [&str; 4] = ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d", "%d.%m.%Y"];
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%b %d %Y - %I:%M%p"];

/// Blank cells and these markers denote an absent optional figure.
const ABSENT: [&str; 3] = ["N/A", "NA", "-"];

fn find_column(headers: &StringRecord, aliases: &[&'static str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|header| header == *alias))
}

fn require_column(headers: &StringRecord, aliases: &[&'static str]) -> Result<usize, DataError> {
    find_column(headers, aliases).ok_or(DataError::MissingColumn(aliases[0]))
}

struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
}
impl<'a> Row<'a> {
    fn new(record: &'a StringRecord) -> Self {
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        Self { record, line }
    }

    fn required(&self, index: usize, column: &'static str) -> Result<&'a str, DataError> {
        match self.record.get(index) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(DataError::MissingValue {
                line: self.line,
                column,
            }),
        }
    }

    fn optional(&self, index: Option<usize>) -> Option<&'a str> {
        index
            .and_then(|index| self.record.get(index))
            .filter(|value| !value.is_empty() && !ABSENT.contains(value))
    }

    fn invalid(&self, column: &'static str, value: &str) -> DataError {
        DataError::InvalidValue {
            line: self.line,
            column,
            value: value.into(),
        }
    }

    fn goals(&self, index: usize, column: &'static str) -> Result<u8, DataError> {
        let value = self.required(index, column)?;
        value.parse().map_err(|_| self.invalid(column, value))
    }

    fn non_negative(&self, value: &str, column: &'static str) -> Result<f64, DataError> {
        match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(parsed),
            _ => Err(self.invalid(column, value)),
        }
    }
}

/// Parses a date in one of the common formats found in match data, ignoring any time of day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|date_time| date_time.date())
        })
}

/// Reads a match history, ordered chronologically if the source carries dates. Rows with an
/// unparseable date are kept and ordered after the dated ones.
pub fn read_fixtures(reader: impl Read) -> Result<Vec<Fixture>, DataError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let home_team = require_column(&headers, &HOME_TEAM)?;
    let away_team = require_column(&headers, &AWAY_TEAM)?;
    let home_goals = require_column(&headers, &HOME_GOALS)?;
    let away_goals = require_column(&headers, &AWAY_GOALS)?;
    let home_xg = find_column(&headers, &HOME_XG);
    let away_xg = find_column(&headers, &AWAY_XG);
    let date = find_column(&headers, &DATE);

    let mut fixtures = vec![];
    let mut undated = 0;
    for record in reader.records() {
        let record = record?;
        let row = Row::new(&record);
        let fixture_date = row.optional(date).and_then(parse_date);
        if date.is_some() && fixture_date.is_none() {
            undated += 1;
        }
        fixtures.push(Fixture {
            date: fixture_date,
            home_team: row.required(home_team, HOME_TEAM[0])?.into(),
            away_team: row.required(away_team, AWAY_TEAM[0])?.into(),
            home_goals: row.goals(home_goals, HOME_GOALS[0])?,
            away_goals: row.goals(away_goals, AWAY_GOALS[0])?,
            home_xg: row
                .optional(home_xg)
                .map(|value| row.non_negative(value, HOME_XG[0]))
                .transpose()?,
            away_xg: row
                .optional(away_xg)
                .map(|value| row.non_negative(value, AWAY_XG[0]))
                .transpose()?,
        });
    }

    if date.is_some() {
        if undated > 0 {
            debug!("{undated} fixtures without a usable date");
        }
        fixtures.sort_by_key(|fixture| (fixture.date.is_none(), fixture.date));
    } else {
        info!("no date column; processing fixtures in file order");
    }
    Ok(fixtures)
}

pub fn read_fixtures_file(path: impl AsRef<Path>) -> Result<Vec<Fixture>, DataError> {
    read_fixtures(File::open(path)?)
}

/// Reads a season league table of cumulative xG and xGA per team.
pub fn read_league_table(reader: impl Read) -> Result<Vec<LeagueTableRow>, DataError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let team = require_column(&headers, &["team"])?;
    let xg = require_column(&headers, &["xG"])?;
    let xga = require_column(&headers, &["xGA"])?;
    let matches = require_column(&headers, &["matches"])?;

    let mut rows = vec![];
    for record in reader.records() {
        let record = record?;
        let row = Row::new(&record);
        let matches_value = row.required(matches, "matches")?;
        rows.push(LeagueTableRow {
            team: row.required(team, "team")?.into(),
            xg: row.non_negative(row.required(xg, "xG")?, "xG")?,
            xga: row.non_negative(row.required(xga, "xGA")?, "xGA")?,
            matches: matches_value
                .parse()
                .map_err(|_| row.invalid("matches", matches_value))?,
        });
    }
    Ok(rows)
}

pub fn read_league_table_file(path: impl AsRef<Path>) -> Result<Vec<LeagueTableRow>, DataError> {
    read_league_table(File::open(path)?)
}
