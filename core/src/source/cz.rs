use crate::error::SourceError;
use crate::source::{FetchOptions, Location, Page, SnapshotSource};

pub const NAME: &str = "cz";
pub const FLAG: &str = "🇨🇿";
pub const URL: &str = "https://onemocneni-aktualne.mzcr.cz/covid-19";

/// Czech Ministry of Health dashboard. Each total sits in its own
/// `<p id="count-...">` with spaces as thousands separators.
pub struct CzSource {
    page: Page,
}

impl CzSource {
    pub fn new(location: Location, options: FetchOptions) -> Self {
        Self {
            page: Page::new(NAME, location, options),
        }
    }

    pub fn boxed(location: Location, options: &FetchOptions) -> Box<dyn SnapshotSource> {
        Box::new(Self::new(location, options.clone()))
    }

    fn count(&self, field: &'static str, id: &str) -> Result<u64, SourceError> {
        let raw = self.page.nth_text(field, &format!("p#{}", id), 0)?;
        self.page.parse_count(field, &raw)
    }

    #[cfg(test)]
    fn from_html(html: &str) -> Self {
        let mut source = Self::new(Location::parse(URL), FetchOptions::default());
        source.page.load_str(html);
        source
    }
}

impl SnapshotSource for CzSource {
    fn name(&self) -> &str {
        NAME
    }

    fn flag(&self) -> &str {
        FLAG
    }

    fn update(&mut self) -> Result<(), SourceError> {
        self.page.update()
    }

    fn total_tested(&self) -> Result<u64, SourceError> {
        self.count("tested", "count-test")
    }

    fn total_positive(&self) -> Result<u64, SourceError> {
        self.count("positive", "count-sick")
    }

    fn total_recovered(&self) -> Result<u64, SourceError> {
        self.count("recovered", "count-recover")
    }

    fn total_dead(&self) -> Result<u64, SourceError> {
        self.count("dead", "count-dead")
    }
}
