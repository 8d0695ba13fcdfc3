/// Shown, and stored by older data files, for users without a username.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A chat user and the locales they receive updates for.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    pub id: i64,
    pub username: Option<String>,
    pub subscribed_to: Vec<String>,
}

impl Subscriber {
    pub fn new(id: i64, username: Option<String>) -> Self {
        Self {
            id,
            username,
            subscribed_to: Vec::new(),
        }
    }

    pub fn subscribed(&self, locale: &str) -> bool {
        let locale = locale.to_lowercase();
        self.subscribed_to.iter().any(|l| *l == locale)
    }

    /// Returns false if already subscribed.
    pub fn subscribe(&mut self, locale: &str) -> bool {
        if self.subscribed(locale) {
            return false;
        }
        self.subscribed_to.push(locale.to_lowercase());
        true
    }

    /// Returns false if not subscribed.
    pub fn unsubscribe(&mut self, locale: &str) -> bool {
        let locale = locale.to_lowercase();
        let before = self.subscribed_to.len();
        self.subscribed_to.retain(|l| *l != locale);
        self.subscribed_to.len() != before
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}
