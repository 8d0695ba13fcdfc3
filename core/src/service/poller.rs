use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::{error, info, warn};

use crate::error::{CycleError, SourceError};
use crate::model::day_stat::DayStat;
use crate::repository::{SeriesRepository, SubscriberRepository};
use crate::service::covid_stat::CovidStat;
use crate::service::notifier::Notifier;
use crate::service::report::format_update;
use crate::service::subscriptions::Subscriptions;
use crate::service::tracker::Tracker;
use crate::time::attribute_date;

#[derive(Debug)]
pub enum LocaleOutcome {
    /// Source reports the same totals as the series.
    Unchanged,
    /// The delta was merged (under its possibly corrected date) and persisted.
    Merged(DayStat),
    Failed(CycleError),
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<(String, LocaleOutcome)>,
}

impl CycleReport {
    pub fn merged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LocaleOutcome::Merged(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LocaleOutcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, locale: &str) -> Option<&LocaleOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == locale)
            .map(|(_, o)| o)
    }
}

/// Drives every locale through refresh, delta, notify, merge and persist.
///
/// Each computed non-empty delta is merged exactly once. A locale that fails
/// is logged and skipped until the next cycle; the others carry on.
pub struct Poller {
    cutoff: NaiveTime,
    interval: Duration,
}

impl Poller {
    pub fn new(cutoff: NaiveTime, interval: Duration) -> Self {
        Self { cutoff, interval }
    }

    pub fn run_cycle<R, S, N>(
        &self,
        tracker: &mut Tracker<R>,
        subscriptions: &Subscriptions<S>,
        notifier: &mut N,
        now: NaiveDateTime,
    ) -> CycleReport
    where
        R: SeriesRepository,
        S: SubscriberRepository,
        N: Notifier,
    {
        let mut report = CycleReport::default();
        for stat in tracker.iter_mut() {
            let name = stat.name().to_string();
            let outcome = match self.poll_locale(stat, subscriptions, notifier, now) {
                Ok(outcome) => outcome,
                Err(e) => {
                    match &e {
                        CycleError::Source(SourceError::Unavailable { .. }) => {
                            warn!(locale = %name, error = %e, "source unavailable, retrying next cycle")
                        }
                        CycleError::Source(_) => error!(locale = %name, error = %e, "cannot read source"),
                        CycleError::Persistence(_) => {
                            error!(locale = %name, error = %e, "series merged in memory but not saved")
                        }
                    }
                    LocaleOutcome::Failed(e)
                }
            };
            report.outcomes.push((name, outcome));
        }
        info!(
            locales = report.outcomes.len(),
            merged = report.merged(),
            failed = report.failed(),
            "cycle finished"
        );
        report
    }

    fn poll_locale<R, S, N>(
        &self,
        stat: &mut CovidStat<R>,
        subscriptions: &Subscriptions<S>,
        notifier: &mut N,
        now: NaiveDateTime,
    ) -> Result<LocaleOutcome, CycleError>
    where
        R: SeriesRepository,
        S: SubscriberRepository,
        N: Notifier,
    {
        stat.refresh()?;
        let delta = stat.compute_delta_on(now.date())?;
        if delta.is_empty() {
            return Ok(LocaleOutcome::Unchanged);
        }

        let message = format_update(stat.flag(), stat.name(), &stat.totals(), &delta);
        for user_id in subscriptions.recipients(stat.name()) {
            if let Err(e) = notifier.send(user_id, &message) {
                warn!(locale = %stat.name(), user_id, error = %e, "notification not delivered");
            }
        }

        let delta = delta.with_date(attribute_date(now, self.cutoff));
        stat.merge(delta);
        stat.persist()?;
        info!(locale = %stat.name(), %delta, "delta merged");
        Ok(LocaleOutcome::Merged(delta))
    }

    /// Runs cycles forever, or `max_cycles` times, sleeping in between.
    pub fn watch<R, S, N>(
        &self,
        tracker: &mut Tracker<R>,
        subscriptions: &Subscriptions<S>,
        notifier: &mut N,
        max_cycles: Option<usize>,
    ) where
        R: SeriesRepository,
        S: SubscriberRepository,
        N: Notifier,
    {
        let mut cycles = 0;
        loop {
            self.run_cycle(tracker, subscriptions, notifier, Local::now().naive_local());
            cycles += 1;
            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }
            thread::sleep(self.interval);
        }
    }
}
