pub mod day_stat;
pub mod series;
pub mod snapshot;
pub mod subscriber;
