pub mod series;
pub mod subscriber;

// Re-export
pub use series::{FileSeriesRepository, SeriesRepository};
pub use subscriber::{FileSubscriberRepository, SubscriberRepository};
