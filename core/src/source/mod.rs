//! Snapshot sources: one implementation per locale, each reading the current
//! cumulative totals out of a public web page.

pub mod cz;
pub mod page;
pub mod registry;
pub mod ru;
pub mod ua;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SourceError;
use crate::model::snapshot::Snapshot;

pub use page::Page;
pub use registry::{SourceEntry, SourceRegistry};

/// Where a source reads its document from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    File(PathBuf),
}

impl Location {
    /// `http://` and `https://` are fetched, anything else is a file path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            Location::Url(input.to_string())
        } else {
            Location::File(PathBuf::from(input))
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Current cumulative totals of one locale.
///
/// `update()` refreshes the cached document; the accessors only parse the
/// cached copy. An accessor must fail with [`SourceError::FormatChanged`]
/// when its field is not where it is expected, never fall back to zero.
pub trait SnapshotSource {
    /// Locale code, lowercase.
    fn name(&self) -> &str;
    fn flag(&self) -> &str;

    fn update(&mut self) -> Result<(), SourceError>;

    fn total_tested(&self) -> Result<u64, SourceError>;
    fn total_positive(&self) -> Result<u64, SourceError>;
    fn total_recovered(&self) -> Result<u64, SourceError>;
    fn total_dead(&self) -> Result<u64, SourceError>;

    /// All four totals. Fails with `FormatChanged` when a total does not fit
    /// the signed counters of a series.
    fn snapshot(&self) -> Result<Snapshot, SourceError> {
        Ok(Snapshot {
            tested: in_counter_range(self.name(), "tested", self.total_tested()?)?,
            positive: in_counter_range(self.name(), "positive", self.total_positive()?)?,
            recovered: in_counter_range(self.name(), "recovered", self.total_recovered()?)?,
            dead: in_counter_range(self.name(), "dead", self.total_dead()?)?,
        })
    }
}

fn in_counter_range(locale: &str, field: &'static str, value: u64) -> Result<u64, SourceError> {
    match i64::try_from(value) {
        Ok(_) => Ok(value),
        Err(_) => Err(SourceError::format_changed(
            locale,
            field,
            format!("{} is out of range", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("https://covid19.com.ua/en"),
            Location::Url("https://covid19.com.ua/en".to_string())
        );
        assert_eq!(
            Location::parse("./cz/covid_cz.html"),
            Location::File(PathBuf::from("./cz/covid_cz.html"))
        );
    }

    #[test]
    fn test_in_counter_range() {
        assert_eq!(in_counter_range("cz", "tested", i64::MAX as u64).unwrap(), i64::MAX as u64);
        match in_counter_range("cz", "tested", i64::MAX as u64 + 1) {
            Err(SourceError::FormatChanged { field, .. }) => assert_eq!(field, "tested"),
            other => panic!("expected FormatChanged, got {:?}", other),
        }
    }
}
