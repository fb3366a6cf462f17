// src/selection.rs
//! Band and date selectors used when exporting a feature.
//!
//! A selector is either an ordered list of 0-based indices, gathered in the
//! given order, or an inclusive range. Date ranges may be bounded by indices
//! into the tile's timestamps or by date-times; ISO strings are parsed into
//! date-times when the selector is built, so resolution never re-inspects types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which bands (last array axis) to export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SelectionRepr")]
pub enum BandSelection {
    Indices(Vec<usize>),
    Range { start: usize, end: usize },
}

impl Default for BandSelection {
    fn default() -> Self {
        BandSelection::Indices(vec![0])
    }
}

impl BandSelection {
    pub fn indices(indices: Vec<usize>) -> Result<Self> {
        check_indices(&indices)?;
        Ok(BandSelection::Indices(indices))
    }

    pub fn range(start: usize, end: usize) -> Result<Self> {
        check_range(start, end)?;
        Ok(BandSelection::Range { start, end })
    }

    /// Resolves the selector against an axis of `band_count` bands.
    pub fn resolve(&self, band_count: usize) -> Result<Vec<usize>> {
        let selected = match self {
            BandSelection::Indices(indices) => {
                check_bounds("band", indices, band_count)?;
                indices.clone()
            }
            BandSelection::Range { start, end } => (0..band_count)
                .filter(|band| (*start..=*end).contains(band))
                .collect(),
        };
        if selected.is_empty() {
            return Err(Error::invalid_config(format!(
                "band selection {:?} selects no bands out of {}",
                self, band_count
            )));
        }
        Ok(selected)
    }
}

/// Parses `0,2,1` as an index list and `0..3` as an inclusive range.
impl FromStr for BandSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once("..") {
            Some((start, end)) => BandSelection::range(parse_index(start, s)?, parse_index(end, s)?),
            None => BandSelection::indices(parse_index_list(s)?),
        }
    }
}

/// Inclusive bounds of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// Bounds are positions in the tile's timestamps.
    Indices { start: usize, end: usize },
    Times {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Which time steps to export from a temporal feature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SelectionRepr")]
pub enum DateSelection {
    Indices(Vec<usize>),
    Range(DateRange),
}

impl Default for DateSelection {
    fn default() -> Self {
        DateSelection::Indices(vec![0])
    }
}

impl DateSelection {
    pub fn indices(indices: Vec<usize>) -> Result<Self> {
        check_indices(&indices)?;
        Ok(DateSelection::Indices(indices))
    }

    pub fn index_range(start: usize, end: usize) -> Result<Self> {
        check_range(start, end)?;
        Ok(DateSelection::Range(DateRange::Indices { start, end }))
    }

    pub fn time_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_config(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(DateSelection::Range(DateRange::Times { start, end }))
    }

    pub fn iso_range(start: &str, end: &str) -> Result<Self> {
        DateSelection::time_range(parse_iso_datetime(start)?, parse_iso_datetime(end)?)
    }

    /// Resolves the selector against a time axis of length `time_len`.
    ///
    /// Ranges filter `timestamps` inclusively; integer range bounds are first
    /// looked up in `timestamps` and then used as time bounds.
    pub fn resolve(&self, timestamps: &[NaiveDateTime], time_len: usize) -> Result<Vec<usize>> {
        let selected: Vec<usize> = match self {
            DateSelection::Indices(indices) => {
                check_bounds("time", indices, time_len)?;
                indices.clone()
            }
            DateSelection::Range(range) => {
                let (start, end) = match *range {
                    DateRange::Indices { start, end } => {
                        check_bounds("timestamp", &[start, end], timestamps.len())?;
                        (timestamps[start], timestamps[end])
                    }
                    DateRange::Times { start, end } => (start, end),
                };
                let selected: Vec<usize> = timestamps
                    .iter()
                    .enumerate()
                    .filter(|(_, time)| (start..=end).contains(*time))
                    .map(|(index, _)| index)
                    .collect();
                check_bounds("time", &selected, time_len)?;
                selected
            }
        };
        if selected.is_empty() {
            return Err(Error::invalid_config(format!(
                "date selection {:?} selects no time steps",
                self
            )));
        }
        Ok(selected)
    }
}

/// Parses `0,1` as an index list, `0..2` as an index range and
/// `2017-01-01..2017-02-01` as a date-time range.
impl FromStr for DateSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((start, end)) = s.split_once("..") else {
            return DateSelection::indices(parse_index_list(s)?);
        };
        match (start.trim().parse::<usize>(), end.trim().parse::<usize>()) {
            (Ok(start), Ok(end)) => DateSelection::index_range(start, end),
            (Err(_), Err(_)) => DateSelection::iso_range(start, end),
            _ => Err(Error::invalid_config(format!(
                "invalid date range '{}', expected two indices or two ISO dates",
                s
            ))),
        }
    }
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.f]` into a naive date-time.
/// Date-times with a zone designator are converted to UTC.
pub fn parse_iso_datetime(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
    }
    // Zone designators (`Z`, `+01:00`) are converted to UTC
    if let Ok(time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(time.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::invalid_config(format!("'{}' is not an ISO 8601 date", s)))
}

fn parse_index(part: &str, whole: &str) -> Result<usize> {
    part.trim().parse::<usize>().map_err(|_| {
        Error::invalid_config(format!(
            "invalid index '{}' in '{}', expected non-negative integers",
            part.trim(),
            whole
        ))
    })
}

fn parse_index_list(s: &str) -> Result<Vec<usize>> {
    s.split(',').map(|part| parse_index(part, s)).collect()
}

fn check_indices(indices: &[usize]) -> Result<()> {
    if indices.is_empty() {
        return Err(Error::invalid_config("index list must not be empty"));
    }
    Ok(())
}

fn check_range(start: usize, end: usize) -> Result<()> {
    if start > end {
        return Err(Error::invalid_config(format!(
            "range ({}, {}) has start after end",
            start, end
        )));
    }
    Ok(())
}

fn check_bounds(axis: &'static str, indices: &[usize], len: usize) -> Result<()> {
    match indices.iter().find(|&&index| index >= len) {
        Some(&index) => Err(Error::IndexOutOfBounds { axis, index, len }),
        None => Ok(()),
    }
}

/// Loosely-typed JSON form of a selector, validated into the typed enums.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    List(Vec<Value>),
    Bounds { start: Value, end: Value },
    Text(String),
    Other(Value),
}

fn value_as_index(value: &Value, context: &Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
        .ok_or_else(|| {
            Error::invalid_config(format!(
                "invalid format in {}, expected non-negative integers",
                context
            ))
        })
}

fn list_indices(values: &[Value]) -> Result<Vec<usize>> {
    let context = Value::Array(values.to_vec());
    values
        .iter()
        .map(|value| value_as_index(value, &context))
        .collect()
}

fn bounds_context(start: &Value, end: &Value) -> Value {
    Value::Array(vec![start.clone(), end.clone()])
}

fn not_a_selector(value: &Value) -> Error {
    Error::invalid_config(format!(
        "invalid format in {}, expected a list, a {{start, end}} range or a string",
        value
    ))
}

impl TryFrom<SelectionRepr> for BandSelection {
    type Error = Error;

    fn try_from(repr: SelectionRepr) -> Result<Self> {
        match repr {
            SelectionRepr::List(values) => BandSelection::indices(list_indices(&values)?),
            SelectionRepr::Bounds { start, end } => {
                let context = bounds_context(&start, &end);
                BandSelection::range(
                    value_as_index(&start, &context)?,
                    value_as_index(&end, &context)?,
                )
            }
            SelectionRepr::Text(text) => text.parse(),
            SelectionRepr::Other(value) => Err(not_a_selector(&value)),
        }
    }
}

impl TryFrom<SelectionRepr> for DateSelection {
    type Error = Error;

    fn try_from(repr: SelectionRepr) -> Result<Self> {
        match repr {
            SelectionRepr::List(values) => DateSelection::indices(list_indices(&values)?),
            SelectionRepr::Bounds { start, end } => match (&start, &end) {
                (Value::String(start), Value::String(end)) => DateSelection::iso_range(start, end),
                (Value::Number(_), Value::Number(_)) => {
                    let context = bounds_context(&start, &end);
                    DateSelection::index_range(
                        value_as_index(&start, &context)?,
                        value_as_index(&end, &context)?,
                    )
                }
                _ => Err(Error::invalid_config(format!(
                    "invalid format in {}, expected two integers or two ISO dates",
                    bounds_context(&start, &end)
                ))),
            },
            SelectionRepr::Text(text) => text.parse(),
            SelectionRepr::Other(value) => Err(not_a_selector(&value)),
        }
    }
}
