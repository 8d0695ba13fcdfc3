use crate::error::SourceError;
use crate::source::{FetchOptions, Location, Page, SnapshotSource};

pub const NAME: &str = "ua";
pub const FLAG: &str = "🇺🇦";
pub const URL: &str = "https://covid19.com.ua/en";

const VALUES: &str = "div.field-value";

pub struct UaSource {
    page: Page,
}

impl UaSource {
    pub fn new(location: Location, options: FetchOptions) -> Self {
        Self {
            page: Page::new(NAME, location, options),
        }
    }

    pub fn boxed(location: Location, options: &FetchOptions) -> Box<dyn SnapshotSource> {
        Box::new(Self::new(location, options.clone()))
    }

    fn count(&self, field: &'static str, index: usize) -> Result<u64, SourceError> {
        let raw = self.page.nth_text(field, VALUES, index)?;
        self.page.parse_count(field, &raw)
    }

    #[cfg(test)]
    fn from_html(html: &str) -> Self {
        let mut source = Self::new(Location::parse(URL), FetchOptions::default());
        source.page.load_str(html);
        source
    }
}

impl SnapshotSource for UaSource {
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
        let raw = self.page.nth_text("tested", VALUES, 0)?;
        self.page.parse_first_token("tested", &raw)
    }

    fn total_positive(&self) -> Result<u64, SourceError> {
        self.count("positive", 1)
    }

    fn total_recovered(&self) -> Result<u64, SourceError> {
        self.count("recovered", 2)
    }

    fn total_dead(&self) -> Result<u64, SourceError> {
        self.count("dead", 3)
    }
}
