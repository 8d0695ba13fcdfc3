use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::error::{SourceError, StoreError};
use crate::model::day_stat::DayStat;
use crate::model::series::{Series, Totals};
use crate::model::snapshot::Snapshot;
use crate::repository::SeriesRepository;
use crate::source::SnapshotSource;

/// Accumulation engine of one locale.
///
/// The stored series holds per-day increments; their sum is the last
/// cumulative total seen. A delta is the source's current snapshot minus that
/// sum, so every computed delta must be merged exactly once: skipping a merge
/// makes the next delta count the gap again, merging twice counts it twice.
pub struct CovidStat<R: SeriesRepository> {
    series: Series,
    source: Box<dyn SnapshotSource>,
    repo: R,
}

impl<R: SeriesRepository> CovidStat<R> {
    /// Engine with an empty in-memory series. Call [`reload`](Self::reload)
    /// to pick up what the store holds.
    pub fn new(source: Box<dyn SnapshotSource>, repo: R) -> Self {
        Self {
            series: Series::new(),
            source,
            repo,
        }
    }

    pub fn load(source: Box<dyn SnapshotSource>, repo: R) -> Result<Self, StoreError> {
        let mut stat = Self::new(source, repo);
        stat.reload()?;
        Ok(stat)
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn flag(&self) -> &str {
        self.source.flag()
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Refreshes the source's cached document.
    pub fn refresh(&mut self) -> Result<(), SourceError> {
        self.source.update()
    }

    pub fn snapshot(&self) -> Result<Snapshot, SourceError> {
        self.source.snapshot()
    }

    /// New since everything recorded so far, dated today.
    pub fn compute_delta(&self) -> Result<DayStat, SourceError> {
        self.compute_delta_on(Local::now().date_naive())
    }

    pub fn compute_delta_on(&self, date: NaiveDate) -> Result<DayStat, SourceError> {
        let snapshot = self.snapshot()?;
        let delta = DayStat::delta(date, &snapshot, &self.series.totals());
        debug!(locale = %self.name(), %delta, "delta computed");
        Ok(delta)
    }

    /// Adds `stat` onto its date. In memory only, see [`persist`](Self::persist).
    pub fn merge(&mut self, stat: DayStat) {
        self.series.merge(stat);
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.repo.save(&self.series)
    }

    /// Replaces the in-memory series with the store's content.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let series = self.stored_series()?;
        self.replace_series(series);
        Ok(())
    }

    /// What the store holds right now, leaving memory untouched.
    pub fn stored_series(&self) -> Result<Series, StoreError> {
        self.repo.load()
    }

    pub(crate) fn replace_series(&mut self, series: Series) {
        self.series = series;
    }

    pub fn totals(&self) -> Totals {
        self.series.totals()
    }

    pub fn total_tested(&self) -> i64 {
        self.totals().tested
    }

    pub fn total_positive(&self) -> i64 {
        self.totals().positive
    }

    pub fn total_recovered(&self) -> i64 {
        self.totals().recovered
    }

    pub fn total_dead(&self) -> i64 {
        self.totals().dead
    }
}
