//! Chart data for the reporting layer. Rendering is up to the caller.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::model::day_stat::DayStat;
use crate::model::series::Series;

/// Marks a selector that plots the mean of a field as a flat line.
pub const AVERAGE_PREFIX: &str = "average:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tested,
    Positive,
    Recovered,
    Dead,
    Percent,
}

impl Field {
    pub fn value(&self, stat: &DayStat) -> f64 {
        match self {
            Field::Tested => stat.tested as f64,
            Field::Positive => stat.positive as f64,
            Field::Recovered => stat.recovered as f64,
            Field::Dead => stat.dead as f64,
            Field::Percent => stat.percent(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Tested => "tested",
            Field::Positive => "positive",
            Field::Recovered => "recovered",
            Field::Dead => "dead",
            Field::Percent => "percent",
        }
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tested" => Ok(Field::Tested),
            "positive" => Ok(Field::Positive),
            "recovered" => Ok(Field::Recovered),
            "dead" => Ok(Field::Dead),
            "percent" => Ok(Field::Percent),
            other => Err(anyhow!("Unknown field '{}'", other)),
        }
    }
}

/// What one chart line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Per-date values of the field.
    Value(Field),
    /// Mean of the field over the visible range, repeated for every date.
    Average(Field),
}

impl Selector {
    pub fn label(&self) -> &'static str {
        match self {
            Selector::Value(field) => field.name(),
            Selector::Average(_) => "average",
        }
    }
}

impl FromStr for Selector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_prefix(AVERAGE_PREFIX) {
            Some(field) => Ok(Selector::Average(field.parse()?)),
            None => Ok(Selector::Value(s.parse()?)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Value(field) => write!(f, "{}", field.name()),
            Selector::Average(field) => write!(f, "{}{}", AVERAGE_PREFIX, field.name()),
        }
    }
}

pub fn parse_selectors(input: &[&str]) -> Result<Vec<Selector>> {
    input.iter().map(|s| s.parse()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub lines: Vec<ChartLine>,
}

/// Days shown on a chart: the whole series except a trailing day whose
/// percent is still 0, which is a day without tests reported yet.
pub fn visible_range(series: &Series) -> Vec<&DayStat> {
    let mut days: Vec<&DayStat> = series.iter().collect();
    if days.last().map(|d| d.percent() == 0.0).unwrap_or(false) {
        days.pop();
    }
    days
}

/// Lines for `selectors` over the visible range. The title defaults to the
/// selectors joined by " vs " and is prefixed with the locale.
pub fn build_chart(locale: &str, series: &Series, selectors: &[Selector], title: Option<&str>) -> Chart {
    let days = visible_range(series);

    let lines = selectors
        .iter()
        .map(|selector| {
            let points = match selector {
                Selector::Value(field) => days.iter().map(|d| field.value(d)).collect(),
                Selector::Average(field) => {
                    if days.is_empty() {
                        Vec::new()
                    } else {
                        let avg = days.iter().map(|d| field.value(d)).sum::<f64>() / days.len() as f64;
                        vec![avg; days.len()]
                    }
                }
            };
            ChartLine {
                label: selector.label().to_string(),
                points,
            }
        })
        .collect();

    let title = match title {
        Some(t) => t.to_string(),
        None => selectors
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" vs "),
    };

    Chart {
        title: format!("{} {}", locale.to_uppercase(), title),
        dates: days.iter().map(|d| d.date).collect(),
        lines,
    }
}

/// The charts answering `/graph <locale>`.
pub fn graph_set(locale: &str, series: &Series) -> Vec<Chart> {
    use Field::*;
    vec![
        build_chart(locale, series, &[Selector::Value(Tested), Selector::Value(Positive)], None),
        build_chart(
            locale,
            series,
            &[Selector::Value(Percent), Selector::Average(Percent)],
            Some("positive / tested, %"),
        ),
        build_chart(locale, series, &[Selector::Value(Recovered), Selector::Value(Dead)], None),
    ]
}
