use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;
use crate::model::day_stat::DayStat;
use crate::model::series::Series;
use crate::time::{format_date, parse_date};

const HEADER: [&str; 5] = ["Date", "Tested", "Positive", "Recovered", "Dead"];

/// Durable home of one locale's series.
pub trait SeriesRepository {
    /// Full content of the store. A store that was never written is empty.
    fn load(&self) -> Result<Series, StoreError>;
    /// Overwrites the store with `series`.
    fn save(&self, series: &Series) -> Result<(), StoreError>;
}

#[derive(Deserialize)]
struct SeriesRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Tested")]
    tested: i64,
    #[serde(rename = "Positive")]
    positive: i64,
    #[serde(rename = "Recovered")]
    recovered: i64,
    #[serde(rename = "Dead")]
    dead: i64,
}

/// `covid_data_<locale>.csv` in the data directory.
#[derive(Clone, Debug)]
pub struct FileSeriesRepository {
    file_path: PathBuf,
}

impl FileSeriesRepository {
    pub fn new(base_dir: &Path, locale: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(base_dir).map_err(|source| StoreError::Io {
            path: base_dir.to_path_buf(),
            source,
        })?;
        let file_path = base_dir.join(format!("covid_data_{}.csv", locale.to_lowercase()));
        Ok(FileSeriesRepository { file_path })
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

impl SeriesRepository for FileSeriesRepository {
    fn load(&self) -> Result<Series, StoreError> {
        if !self.file_path.exists() {
            debug!(path = %self.file_path.display(), "no series file yet, starting empty");
            return Ok(Series::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.file_path)
            .map_err(|e| self.csv_err(e))?;

        let headers = reader.headers().map_err(|e| self.csv_err(e))?.clone();
        if headers.iter().ne(HEADER.iter().copied()) {
            return Err(StoreError::BadHeader {
                path: self.file_path.clone(),
                expected: HEADER.join(","),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        // Rows may come in any order, the map sorts them.
        let mut series = Series::new();
        for result in reader.records() {
            let record = result.map_err(|e| self.csv_err(e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: SeriesRow = record
                .deserialize(Some(&headers))
                .map_err(|e| self.csv_err(e))?;
            let date = parse_date(&row.date).map_err(|_| StoreError::BadDate {
                path: self.file_path.clone(),
                line,
                value: row.date.clone(),
            })?;
            series.insert(DayStat::new(date, row.tested, row.positive, row.recovered, row.dead));
        }

        debug!(path = %self.file_path.display(), records = series.len(), "series loaded");
        Ok(series)
    }

    fn save(&self, series: &Series) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.file_path).map_err(|e| self.csv_err(e))?;
        writer.write_record(HEADER).map_err(|e| self.csv_err(e))?;
        for stat in series.iter() {
            writer
                .write_record([
                    format_date(stat.date),
                    stat.tested.to_string(),
                    stat.positive.to_string(),
                    stat.recovered.to_string(),
                    stat.dead.to_string(),
                ])
                .map_err(|e| self.csv_err(e))?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        Ok(())
    }
}
