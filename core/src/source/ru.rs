use crate::error::SourceError;
use crate::source::{FetchOptions, Location, Page, SnapshotSource};

pub const NAME: &str = "ru";
pub const FLAG: &str = "🇷🇺";
pub const URL: &str = "https://xn--80aesfpebagmfblc0a.xn--p1ai/";

const VALUES: &str = "div.cv-countdown__item-value > span";

/// стопкоронавирус.рф counters. The five values are positional; tests are
/// reported in thousands ("536 тыс").
pub struct RuSource {
    page: Page,
}

impl RuSource {
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

impl SnapshotSource for RuSource {
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
        let thousands = self.page.parse_first_token("tested", &raw)?;
        thousands
            .checked_mul(1000)
            .ok_or_else(|| SourceError::format_changed(NAME, "tested", format!("{} thousand is out of range", thousands)))
    }

    fn total_positive(&self) -> Result<u64, SourceError> {
        self.count("positive", 1)
    }

    // index 2 is "new today", not a total
    fn total_recovered(&self) -> Result<u64, SourceError> {
        self.count("recovered", 3)
    }

    fn total_dead(&self) -> Result<u64, SourceError> {
        self.count("dead", 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::snapshot::Snapshot;

    const PAGE: &str = r#"
        <html><body><div class="cv-countdown">
          <div class="cv-countdown__item"><div class="cv-countdown__item-value _accent"><span>&gt;536 тыс</span></div></div>
          <div class="cv-countdown__item"><div class="cv-countdown__item-value"><span>2 337</span></div></div>
          <div class="cv-countdown__item"><div class="cv-countdown__item-value"><span>500</span></div></div>
          <div class="cv-countdown__item"><div class="cv-countdown__item-value"><span>121</span></div></div>
          <div class="cv-countdown__item"><div class="cv-countdown__item-value"><span>17</span></div></div>
        </div></body></html>"#;

    #[test]
    fn test_snapshot() {
        let source = RuSource::from_html(PAGE);
        assert_eq!(source.snapshot().unwrap(), Snapshot::new(536_000, 2_337, 121, 17));
    }

    #[test]
    fn test_tested_overflow_is_format_changed() {
        let source = RuSource::from_html(&PAGE.replace("&gt;536 тыс", "18446744073709552 тыс"));
        match source.total_tested() {
            Err(SourceError::FormatChanged { field, .. }) => assert_eq!(field, "tested"),
            other => panic!("expected FormatChanged, got {:?}", other),
        }
        // fits u64 after the multiplication but not a series counter
        let source = RuSource::from_html(&PAGE.replace("&gt;536 тыс", "9223372036854776 тыс"));
        assert!(source.total_tested().is_ok());
        assert!(matches!(source.snapshot(), Err(SourceError::FormatChanged { .. })));
    }

    #[test]
    fn test_truncated_page_is_format_changed() {
        let source = RuSource::from_html("<html><body><div class='cv-countdown__item-value'><span>1</span></div></body></html>");
        assert!(matches!(source.total_dead(), Err(SourceError::FormatChanged { .. })));
    }
}
