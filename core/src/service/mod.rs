pub mod chart;
pub mod covid_stat;
pub mod dispatch;
pub mod notifier;
pub mod poller;
pub mod report;
pub mod subscriptions;
pub mod tracker;

#[cfg(test)]
mod covid_stat_test;
#[cfg(test)]
pub(crate) mod testing;
