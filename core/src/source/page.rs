use std::fs;

use scraper::{Html, Selector};
use tracing::debug;

use crate::error::SourceError;
use crate::source::{FetchOptions, Location};

/// Cached HTML document of a locale page plus the helpers the locale
/// sources use to pull numbers out of it.
pub struct Page {
    locale: String,
    location: Location,
    options: FetchOptions,
    document: Option<Html>,
}

impl Page {
    pub fn new(locale: &str, location: Location, options: FetchOptions) -> Self {
        Self {
            locale: locale.to_string(),
            location,
            options,
            document: None,
        }
    }

    /// Fetches the document again and replaces the cached copy. On failure
    /// the previous copy is kept.
    pub fn update(&mut self) -> Result<(), SourceError> {
        let body = match &self.location {
            Location::Url(url) => self.fetch(url)?,
            Location::File(path) => fs::read_to_string(path)
                .map_err(|e| SourceError::unavailable(&self.locale, format!("{}: {}", path.display(), e)))?,
        };
        debug!(locale = %self.locale, bytes = body.len(), "document refreshed");
        self.load_str(&body);
        Ok(())
    }

    pub fn load_str(&mut self, html: &str) {
        self.document = Some(Html::parse_document(html));
    }

    fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.options.timeout)
            .danger_accept_invalid_certs(self.options.accept_invalid_certs)
            .user_agent(concat!("covidstat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::unavailable(&self.locale, e))?;

        client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| SourceError::unavailable(&self.locale, e))
    }

    /// Text content of every element matching `selector`, in document order.
    pub fn texts(&self, field: &'static str, selector: &str) -> Result<Vec<String>, SourceError> {
        let document = self.document.as_ref().ok_or_else(|| SourceError::NotLoaded {
            locale: self.locale.clone(),
        })?;
        let selector = Selector::parse(selector)
            .map_err(|e| SourceError::format_changed(&self.locale, field, format!("bad selector: {}", e)))?;
        Ok(document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect())
    }

    /// Text of the `index`-th element matching `selector`.
    pub fn nth_text(&self, field: &'static str, selector: &str, index: usize) -> Result<String, SourceError> {
        let mut texts = self.texts(field, selector)?;
        if index >= texts.len() {
            return Err(SourceError::format_changed(
                &self.locale,
                field,
                format!("'{}' matched {} elements, wanted #{}", selector, texts.len(), index),
            ));
        }
        Ok(texts.swap_remove(index))
    }

    /// A number written with any whitespace as thousands separator.
    pub fn parse_count(&self, field: &'static str, raw: &str) -> Result<u64, SourceError> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        digits
            .parse()
            .map_err(|_| SourceError::format_changed(&self.locale, field, format!("not a number: '{}'", raw.trim())))
    }

    /// The first whitespace separated token as a number, e.g. `"536 тыс"`.
    pub fn parse_first_token(&self, field: &'static str, raw: &str) -> Result<u64, SourceError> {
        let token = raw
            .split_whitespace()
            .next()
            .map(|t| t.trim_matches(|c| c == '<' || c == '>'))
            .unwrap_or("");
        token
            .parse()
            .map_err(|_| SourceError::format_changed(&self.locale, field, format!("not a number: '{}'", raw.trim())))
    }
}
