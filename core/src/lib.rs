pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod source;
pub mod time;

pub use config::AppConfig;
pub use error::{CycleError, SourceError, StoreError};
pub use model::day_stat::DayStat;
pub use model::series::{Series, Totals};
pub use model::snapshot::Snapshot;
pub use model::subscriber::Subscriber;
pub use repository::{FileSeriesRepository, FileSubscriberRepository, SeriesRepository, SubscriberRepository};
pub use service::covid_stat::CovidStat;
pub use service::dispatch::{ChatUser, Command, Dispatcher, Reply};
pub use service::notifier::Notifier;
pub use service::poller::{CycleReport, LocaleOutcome, Poller};
pub use service::subscriptions::Subscriptions;
pub use service::tracker::Tracker;
pub use source::{FetchOptions, Location, SnapshotSource, SourceRegistry};
