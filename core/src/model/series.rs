use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::day_stat::DayStat;

/// Running sums over a whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub tested: i64,
    pub positive: i64,
    pub recovered: i64,
    pub dead: i64,
}

/// Per-date history of one locale. At most one record per date; gaps are
/// allowed and mean "no data", not zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Series {
    by_date: BTreeMap<NaiveDate, DayStat>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayStat> {
        self.by_date.get(&date)
    }

    /// Replaces whatever is stored for `stat.date`. Used by loaders only.
    pub fn insert(&mut self, stat: DayStat) {
        self.by_date.insert(stat.date, stat);
    }

    /// Adds `stat` onto the record of its date, starting from zero when the
    /// date is new. Calling it twice with the same record counts it twice.
    pub fn merge(&mut self, stat: DayStat) {
        let entry = self
            .by_date
            .entry(stat.date)
            .or_insert_with(|| DayStat::zero(stat.date));
        *entry += stat;
    }

    pub fn totals(&self) -> Totals {
        self.by_date.values().fold(Totals::default(), |mut acc, s| {
            acc.tested += s.tested;
            acc.positive += s.positive;
            acc.recovered += s.recovered;
            acc.dead += s.dead;
            acc
        })
    }

    /// Records in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = &DayStat> {
        self.by_date.values()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

impl FromIterator<DayStat> for Series {
    fn from_iter<I: IntoIterator<Item = DayStat>>(iter: I) -> Self {
        let mut series = Series::new();
        for stat in iter {
            series.insert(stat);
        }
        series
    }
}
