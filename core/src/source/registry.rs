use std::collections::BTreeMap;

use crate::source::{cz, ru, ua, FetchOptions, Location, SnapshotSource};

pub type SourceFactory = fn(Location, &FetchOptions) -> Box<dyn SnapshotSource>;

/// A locale that can be monitored.
#[derive(Clone)]
pub struct SourceEntry {
    pub name: &'static str,
    pub flag: &'static str,
    pub default_url: &'static str,
    pub build: SourceFactory,
}

/// Named snapshot sources, registered explicitly at startup.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    entries: BTreeMap<String, SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every locale shipped with the crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SourceEntry {
            name: cz::NAME,
            flag: cz::FLAG,
            default_url: cz::URL,
            build: cz::CzSource::boxed,
        });
        registry.register(SourceEntry {
            name: ru::NAME,
            flag: ru::FLAG,
            default_url: ru::URL,
            build: ru::RuSource::boxed,
        });
        registry.register(SourceEntry {
            name: ua::NAME,
            flag: ua::FLAG,
            default_url: ua::URL,
            build: ua::UaSource::boxed,
        });
        registry
    }

    /// Registering a name twice replaces the earlier entry.
    pub fn register(&mut self, entry: SourceEntry) {
        self.entries.insert(entry.name.to_lowercase(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SourceEntry> {
        self.entries.values()
    }

    /// Builds the source for `name`, reading from `location` or the
    /// entry's default URL.
    pub fn build(
        &self,
        name: &str,
        location: Option<Location>,
        options: &FetchOptions,
    ) -> Option<Box<dyn SnapshotSource>> {
        let entry = self.get(name)?;
        let location = location.unwrap_or_else(|| Location::Url(entry.default_url.to_string()));
        Some((entry.build)(location, options))
    }
}
