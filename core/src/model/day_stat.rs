use chrono::{Duration, Local, NaiveDate};
use std::fmt;
use std::ops::{Add, AddAssign};

use crate::model::series::Totals;
use crate::model::snapshot::Snapshot;

/// Counters of one calendar date for one locale.
///
/// In the stored series a record holds what was *added* on that date, so the
/// sum over the whole series is the latest cumulative total. A freshly
/// computed delta uses the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStat {
    pub date: NaiveDate,
    pub tested: i64,
    pub positive: i64,
    pub recovered: i64,
    pub dead: i64,
}

impl DayStat {
    pub fn new(date: NaiveDate, tested: i64, positive: i64, recovered: i64, dead: i64) -> Self {
        Self {
            date,
            tested,
            positive,
            recovered,
            dead,
        }
    }

    pub fn zero(date: NaiveDate) -> Self {
        Self::new(date, 0, 0, 0, 0)
    }

    /// Counters of a snapshot minus already recorded totals, labelled `date`.
    pub fn delta(date: NaiveDate, snapshot: &Snapshot, totals: &Totals) -> Self {
        Self {
            date,
            tested: snapshot.tested as i64 - totals.tested,
            positive: snapshot.positive as i64 - totals.positive,
            recovered: snapshot.recovered as i64 - totals.recovered,
            dead: snapshot.dead as i64 - totals.dead,
        }
    }

    /// Share of positive results among tests, in percent.
    pub fn percent(&self) -> f64 {
        if self.tested == 0 {
            return 0.0;
        }
        self.positive as f64 / self.tested as f64 * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.tested == 0 && self.positive == 0 && self.recovered == 0 && self.dead == 0
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn today(self) -> Self {
        self.with_date(Local::now().date_naive())
    }

    pub fn yesterday(self) -> Self {
        self.with_date(Local::now().date_naive() - Duration::days(1))
    }
}

/// Adding records of different dates is a no-op returning the left side.
impl Add for DayStat {
    type Output = DayStat;

    fn add(self, rhs: DayStat) -> DayStat {
        if self.date != rhs.date {
            return self;
        }
        DayStat {
            date: self.date,
            tested: self.tested + rhs.tested,
            positive: self.positive + rhs.positive,
            recovered: self.recovered + rhs.recovered,
            dead: self.dead + rhs.dead,
        }
    }
}

impl AddAssign for DayStat {
    fn add_assign(&mut self, rhs: DayStat) {
        *self = *self + rhs;
    }
}

impl fmt::Display for DayStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[(t){}, (p){}, (t/p){:.2}%, (r){}, (d){}]",
            self.date.format("%Y%b%d"),
            self.tested,
            self.positive,
            self.percent(),
            self.recovered,
            self.dead
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    #[test]
    fn test_add_same_date_sums_counters() {
        let a = DayStat::new(day(23), 100, 10, 2, 1);
        let b = DayStat::new(day(23), 50, 5, 1, 0);
        assert_eq!(a + b, DayStat::new(day(23), 150, 15, 3, 1));
    }

    #[test]
    fn test_add_different_dates_returns_left() {
        let a = DayStat::new(day(23), 100, 10, 2, 1);
        let b = DayStat::new(day(24), 50, 5, 1, 0);
        assert_eq!(a + b, a);

        let mut c = a;
        c += b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_percent() {
        assert_eq!(DayStat::new(day(1), 0, 0, 0, 0).percent(), 0.0);
        assert_eq!(DayStat::new(day(1), 0, 7, 0, 0).percent(), 0.0);
        assert_eq!(DayStat::new(day(1), 200, 10, 0, 0).percent(), 5.0);
        assert!((DayStat::new(day(1), 3, 1, 0, 0).percent() - 33.333).abs() < 0.001);
    }

    #[test]
    fn test_is_empty() {
        assert!(DayStat::zero(day(1)).is_empty());
        assert!(!DayStat::new(day(1), 0, 0, 0, 1).is_empty());
        assert!(!DayStat::new(day(1), -1, 0, 0, 0).is_empty());
    }

    #[test]
    fn test_delta_against_totals() {
        let snapshot = Snapshot::new(120, 12, 3, 1);
        let totals = Totals { tested: 100, positive: 10, recovered: 2, dead: 1 };
        let d = DayStat::delta(day(2), &snapshot, &totals);
        assert_eq!(d, DayStat::new(day(2), 20, 2, 1, 0));
    }

    #[test]
    fn test_display() {
        let s = DayStat::new(day(23), 100, 10, 2, 1);
        assert_eq!(s.to_string(), "2020Mar23[(t)100, (p)10, (t/p)10.00%, (r)2, (d)1]");
    }
}
