//! In-memory doubles shared by the service tests.

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Result};

use crate::error::{SourceError, StoreError};
use crate::model::series::Series;
use crate::model::snapshot::Snapshot;
use crate::model::subscriber::Subscriber;
use crate::repository::{SeriesRepository, SubscriberRepository};
use crate::service::covid_stat::CovidStat;
use crate::service::notifier::Notifier;
use crate::source::SnapshotSource;

#[derive(Default)]
pub struct FakeState {
    pub snapshot: Snapshot,
    pub offline: bool,
    pub layout_changed: bool,
    pub updates: usize,
}

/// Source whose numbers the test controls through a shared handle.
pub struct FakeSource {
    name: String,
    state: Rc<RefCell<FakeState>>,
}

impl FakeSource {
    pub fn new(name: &str) -> (Box<dyn SnapshotSource>, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState::default()));
        let source = FakeSource {
            name: name.to_string(),
            state: Rc::clone(&state),
        };
        (Box::new(source), state)
    }

    fn value(&self, field: &'static str, pick: fn(&Snapshot) -> u64) -> Result<u64, SourceError> {
        let state = self.state.borrow();
        if state.layout_changed {
            return Err(SourceError::format_changed(&self.name, field, "element not found"));
        }
        Ok(pick(&state.snapshot))
    }
}

impl SnapshotSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn flag(&self) -> &str {
        "🏳"
    }

    fn update(&mut self) -> Result<(), SourceError> {
        let mut state = self.state.borrow_mut();
        if state.offline {
            return Err(SourceError::unavailable(&self.name, "connection refused"));
        }
        state.updates += 1;
        Ok(())
    }

    fn total_tested(&self) -> Result<u64, SourceError> {
        self.value("tested", |s| s.tested)
    }

    fn total_positive(&self) -> Result<u64, SourceError> {
        self.value("positive", |s| s.positive)
    }

    fn total_recovered(&self) -> Result<u64, SourceError> {
        self.value("recovered", |s| s.recovered)
    }

    fn total_dead(&self) -> Result<u64, SourceError> {
        self.value("dead", |s| s.dead)
    }
}

#[derive(Clone, Default)]
pub struct MemorySeriesRepository {
    pub stored: Rc<RefCell<Series>>,
    pub fail_save: Rc<RefCell<bool>>,
    pub fail_load: Rc<RefCell<bool>>,
}

fn disk_error(reason: &str) -> StoreError {
    StoreError::Io {
        path: PathBuf::from("memory"),
        source: io::Error::new(io::ErrorKind::Other, reason.to_string()),
    }
}

impl SeriesRepository for MemorySeriesRepository {
    fn load(&self) -> Result<Series, StoreError> {
        if *self.fail_load.borrow() {
            return Err(disk_error("unreadable"));
        }
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, series: &Series) -> Result<(), StoreError> {
        if *self.fail_save.borrow() {
            return Err(disk_error("disk full"));
        }
        *self.stored.borrow_mut() = series.clone();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemorySubscriberRepository {
    pub stored: Rc<RefCell<Vec<Subscriber>>>,
}

impl SubscriberRepository for MemorySubscriberRepository {
    fn load(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, subscribers: &[Subscriber]) -> Result<(), StoreError> {
        *self.stored.borrow_mut() = subscribers.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Vec<(i64, String)>,
    pub unreachable: Vec<i64>,
}

impl Notifier for RecordingNotifier {
    fn send(&mut self, user_id: i64, text: &str) -> Result<()> {
        if self.unreachable.contains(&user_id) {
            return Err(anyhow!("user {} blocked the bot", user_id));
        }
        self.sent.push((user_id, text.to_string()));
        Ok(())
    }
}

/// Engine over a fake source and an in-memory store.
pub fn fake_stat(
    name: &str,
) -> (
    CovidStat<MemorySeriesRepository>,
    Rc<RefCell<FakeState>>,
    MemorySeriesRepository,
) {
    let (source, state) = FakeSource::new(name);
    let repo = MemorySeriesRepository::default();
    (CovidStat::new(source, repo.clone()), state, repo)
}
