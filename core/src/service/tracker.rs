use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::error::StoreError;
use crate::repository::{FileSeriesRepository, SeriesRepository};
use crate::service::covid_stat::CovidStat;
use crate::source::SourceRegistry;

/// Every monitored locale's engine, keyed by locale code.
pub struct Tracker<R: SeriesRepository = FileSeriesRepository> {
    stats: BTreeMap<String, CovidStat<R>>,
}

impl<R: SeriesRepository> Default for Tracker<R> {
    fn default() -> Self {
        Self {
            stats: BTreeMap::new(),
        }
    }
}

impl Tracker<FileSeriesRepository> {
    /// Builds one engine per configured locale and loads its series file.
    pub fn from_config(config: &AppConfig, registry: &SourceRegistry) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let options = config.fetch_options();
        let names: Vec<String> = match &config.locales {
            Some(list) => list.iter().map(|l| l.to_lowercase()).collect(),
            None => registry.names().into_iter().map(String::from).collect(),
        };

        let mut tracker = Tracker::new();
        for name in names {
            let source = registry
                .build(&name, config.source_location(&name), &options)
                .ok_or_else(|| anyhow!("Unknown locale '{}', known: {}", name, registry.names().join(", ")))?;
            let repo = FileSeriesRepository::new(&data_dir, &name)?;
            let stat = CovidStat::load(source, repo)
                .with_context(|| format!("Could not load series of '{}'", name))?;
            info!(locale = %name, records = stat.series().len(), "locale loaded");
            tracker.insert(stat);
        }
        Ok(tracker)
    }
}

impl<R: SeriesRepository> Tracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stat: CovidStat<R>) {
        self.stats.insert(stat.name().to_lowercase(), stat);
    }

    pub fn get(&self, locale: &str) -> Option<&CovidStat<R>> {
        self.stats.get(&locale.to_lowercase())
    }

    pub fn get_mut(&mut self, locale: &str) -> Option<&mut CovidStat<R>> {
        self.stats.get_mut(&locale.to_lowercase())
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.stats.contains_key(&locale.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        self.stats.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CovidStat<R>> {
        self.stats.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CovidStat<R>> {
        self.stats.values_mut()
    }

    /// Reloads every series from its store. Memory is replaced only when
    /// every store loaded; on failure all locales keep their current series.
    pub fn reload_all(&mut self) -> Result<(), StoreError> {
        let loaded = self
            .stats
            .values()
            .map(|stat| stat.stored_series())
            .collect::<Result<Vec<_>, _>>()?;
        for (stat, series) in self.stats.values_mut().zip(loaded) {
            stat.replace_series(series);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
