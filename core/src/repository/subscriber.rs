use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::subscriber::{Subscriber, UNKNOWN_NAME};

const USERS_FILE_NAME: &str = "users.csv";

pub trait SubscriberRepository {
    fn load(&self) -> Result<Vec<Subscriber>, StoreError>;
    fn save(&self, subscribers: &[Subscriber]) -> Result<(), StoreError>;
}

// `subscribed_to` is a ';' joined list, empty for no subscriptions
#[derive(Serialize, Deserialize)]
struct SubscriberRow {
    id: i64,
    username: String,
    subscribed_to: String,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        let username = if row.username.is_empty() || row.username == UNKNOWN_NAME {
            None
        } else {
            Some(row.username)
        };
        let subscribed_to = row
            .subscribed_to
            .to_lowercase()
            .split(';')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Subscriber {
            id: row.id,
            username,
            subscribed_to,
        }
    }
}

impl From<&Subscriber> for SubscriberRow {
    fn from(s: &Subscriber) -> Self {
        SubscriberRow {
            id: s.id,
            username: s.username.clone().unwrap_or_default(),
            subscribed_to: s.subscribed_to.join(";"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileSubscriberRepository {
    file_path: PathBuf,
}

impl FileSubscriberRepository {
    pub fn new(base_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(base_dir).map_err(|source| StoreError::Io {
            path: base_dir.to_path_buf(),
            source,
        })?;
        Ok(FileSubscriberRepository {
            file_path: base_dir.join(USERS_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn csv_err(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.file_path.clone(),
            source,
        }
    }
}

impl SubscriberRepository for FileSubscriberRepository {
    fn load(&self) -> Result<Vec<Subscriber>, StoreError> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.file_path)
            .map_err(|e| self.csv_err(e))?;

        let mut subscribers = Vec::new();
        for row in reader.deserialize::<SubscriberRow>() {
            let row = row.map_err(|e| self.csv_err(e))?;
            subscribers.push(Subscriber::from(row));
        }
        Ok(subscribers)
    }

    fn save(&self, subscribers: &[Subscriber]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.file_path).map_err(|e| self.csv_err(e))?;
        if subscribers.is_empty() {
            writer
                .write_record(["id", "username", "subscribed_to"])
                .map_err(|e| self.csv_err(e))?;
        }
        for s in subscribers {
            writer.serialize(SubscriberRow::from(s)).map_err(|e| self.csv_err(e))?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        Ok(())
    }
}
