//! Chat commands. The transport (a bot API, a terminal) feeds text in and
//! delivers the [`Reply`]; this module only decides what to answer.

use anyhow::Result;
use tracing::{info, warn};

use crate::repository::{SeriesRepository, SubscriberRepository};
use crate::service::chart::{graph_set, Chart};
use crate::service::notifier::Notifier;
use crate::service::report::{format_update, help_text};
use crate::service::subscriptions::Subscriptions;
use crate::service::tracker::Tracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Update,
    Graph(Option<String>),
    Subscribe(Option<String>),
    Unsubscribe(Option<String>),
    Reload,
    Unknown,
}

impl Command {
    /// Accepts `/cmd`, `/cmd <locale>` and the keyboard form
    /// `/cmd: <flag> <locale>`; the locale is always the last word.
    pub fn parse(text: &str) -> Command {
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some(first) = words.first() else {
            return Command::Unknown;
        };
        let name = first.trim_end_matches(':').to_lowercase();
        let locale = if words.len() > 1 {
            words.last().map(|l| l.to_lowercase())
        } else {
            None
        };

        match name.as_str() {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/update" => Command::Update,
            "/graph" => Command::Graph(locale),
            "/subscribe" => Command::Subscribe(locale),
            "/unsubscribe" => Command::Unsubscribe(locale),
            "/reload" => Command::Reload,
            _ => Command::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub text: String,
    pub charts: Vec<Chart>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            charts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.charts.is_empty()
    }
}

/// Who sent a message.
#[derive(Debug, Clone)]
pub struct ChatUser {
    pub id: i64,
    pub username: Option<String>,
}

pub struct Dispatcher<'a, R: SeriesRepository, S: SubscriberRepository> {
    tracker: &'a mut Tracker<R>,
    subscriptions: &'a mut Subscriptions<S>,
    admin_id: Option<i64>,
}

impl<'a, R: SeriesRepository, S: SubscriberRepository> Dispatcher<'a, R, S> {
    pub fn new(tracker: &'a mut Tracker<R>, subscriptions: &'a mut Subscriptions<S>, admin_id: Option<i64>) -> Self {
        Self {
            tracker,
            subscriptions,
            admin_id,
        }
    }

    pub fn handle<N: Notifier>(&mut self, user: &ChatUser, text: &str, notifier: &mut N) -> Result<Reply> {
        let command = Command::parse(text);
        info!(user_id = user.id, ?command, "chat command");

        match command {
            Command::Start => {
                self.checkin(user, notifier)?;
                let locales = self
                    .tracker
                    .iter()
                    .map(|s| format!("{}{}", s.flag(), s.name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Reply::text(format!(
                    "This is a bot to check official COVID-19 stat in {}\n\n{}\nLast updates:\n{}",
                    locales,
                    help_text(),
                    self.last_update(None)
                )))
            }
            Command::Help | Command::Unknown => Ok(Reply::text(help_text())),
            Command::Update => Ok(Reply::text(self.last_update(Some(user.id)))),
            Command::Graph(None) => Ok(self.choose_locale("/graph")),
            Command::Graph(Some(locale)) => match self.tracker.get(&locale) {
                Some(stat) => Ok(Reply {
                    text: String::new(),
                    charts: graph_set(stat.name(), stat.series()),
                }),
                None => Ok(self.unknown_locale(&locale)),
            },
            Command::Subscribe(None) => Ok(self.choose_locale("/subscribe")),
            Command::Subscribe(Some(locale)) => {
                if !self.tracker.contains(&locale) {
                    return Ok(self.unknown_locale(&locale));
                }
                self.checkin(user, notifier)?;
                self.subscriptions.subscribe(user.id, &locale)?;
                Ok(Reply::text(format!("Subscribed to {}", locale)))
            }
            Command::Unsubscribe(None) => Ok(self.choose_locale("/unsubscribe")),
            Command::Unsubscribe(Some(locale)) => {
                self.checkin(user, notifier)?;
                if self.subscriptions.unsubscribe(user.id, &locale)? {
                    Ok(Reply::text(format!("Unsubscribed from {}", locale)))
                } else {
                    Ok(Reply::text(format!("Not subscribed to {}", locale)))
                }
            }
            Command::Reload => {
                if self.admin_id != Some(user.id) {
                    warn!(user_id = user.id, "reload refused, not admin");
                    return Ok(Reply::default());
                }
                self.tracker.reload_all()?;
                self.subscriptions.reload()?;
                Ok(Reply::text("Reloaded"))
            }
        }
    }

    fn checkin<N: Notifier>(&mut self, user: &ChatUser, notifier: &mut N) -> Result<()> {
        if self.subscriptions.checkin(user.id, user.username.as_deref())? {
            info!(user_id = user.id, "new user");
            if let Some(admin) = self.admin_id {
                let name = self
                    .subscriptions
                    .get(user.id)
                    .map(|s| s.display_name().to_string())
                    .unwrap_or_default();
                if let Err(e) = notifier.send(admin, &format!("New user: @{} id={}", name, user.id)) {
                    warn!(error = %e, "admin not notified");
                }
            }
        }
        Ok(())
    }

    /// Current numbers of the user's subscriptions, or of every locale when
    /// the user has none. Deltas are shown, not merged.
    fn last_update(&mut self, user_id: Option<i64>) -> String {
        let subscribed: Vec<String> = user_id
            .and_then(|id| self.subscriptions.get(id))
            .map(|u| u.subscribed_to.clone())
            .unwrap_or_default();
        let locales = if subscribed.is_empty() {
            self.tracker.names()
        } else {
            subscribed
        };

        let mut parts = Vec::new();
        for locale in locales {
            let Some(stat) = self.tracker.get_mut(&locale) else {
                continue;
            };
            let delta = stat.refresh().and_then(|_| stat.compute_delta());
            match delta {
                Ok(delta) => parts.push(format_update(stat.flag(), stat.name(), &stat.totals(), &delta)),
                Err(e) => {
                    warn!(locale = %locale, error = %e, "update for chat failed");
                    parts.push(format!("{}{}: unavailable\n", stat.flag(), stat.name()));
                }
            }
        }
        parts.join("\n")
    }

    fn choose_locale(&self, action: &str) -> Reply {
        let mut text = format!("Choose location to {}\n", action);
        for stat in self.tracker.iter() {
            text.push_str(&format!("{}: {} {}\n", action, stat.flag(), stat.name()));
        }
        Reply::text(text)
    }

    fn unknown_locale(&self, locale: &str) -> Reply {
        Reply::text(format!(
            "Unknown location {}, choose one of: {}",
            locale,
            self.tracker.names().join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::day_stat::DayStat;
    use crate::model::snapshot::Snapshot;
    use crate::service::testing::{fake_stat, MemorySeriesRepository, MemorySubscriberRepository, RecordingNotifier};
    use chrono::NaiveDate;

    const ADMIN: i64 = 1;

    fn user(id: i64) -> ChatUser {
        ChatUser {
            id,
            username: Some(format!("user{}", id)),
        }
    }

    fn setup() -> (Tracker<MemorySeriesRepository>, Subscriptions<MemorySubscriberRepository>) {
        let mut tracker = Tracker::new();
        let (mut cz, cz_state, _) = fake_stat("cz");
        cz.merge(DayStat::new(NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(), 100, 10, 1, 0));
        cz_state.borrow_mut().snapshot = Snapshot::new(110, 11, 1, 0);
        let (ua, ua_state, _) = fake_stat("ua");
        ua_state.borrow_mut().snapshot = Snapshot::new(5, 1, 0, 0);
        tracker.insert(cz);
        tracker.insert(ua);
        let subs = Subscriptions::load(MemorySubscriberRepository::default()).unwrap();
        (tracker, subs)
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/graph"), Command::Graph(None));
        assert_eq!(Command::parse("/graph CZ"), Command::Graph(Some("cz".to_string())));
        assert_eq!(
            Command::parse("/subscribe: 🇨🇿 cz"),
            Command::Subscribe(Some("cz".to_string()))
        );
        assert_eq!(
            Command::parse("/unsubscribe: 🇺🇦 ua"),
            Command::Unsubscribe(Some("ua".to_string()))
        );
        assert_eq!(Command::parse("hello"), Command::Unknown);
        assert_eq!(Command::parse("   "), Command::Unknown);
    }

    #[test]
    fn test_start_checks_in_and_tells_admin() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let reply = Dispatcher::new(&mut tracker, &mut subs, Some(ADMIN))
            .handle(&user(5), "/start", &mut notifier)
            .unwrap();

        assert!(reply.text.contains("🏳cz, 🏳ua"));
        assert!(reply.text.contains("🧪  110 (+10)"));
        assert!(subs.get(5).is_some());
        assert_eq!(notifier.sent, vec![(ADMIN, "New user: @user5 id=5".to_string())]);
    }

    #[test]
    fn test_user_without_username_is_announced_as_unknown() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let anonymous = ChatUser { id: 6, username: None };
        Dispatcher::new(&mut tracker, &mut subs, Some(ADMIN))
            .handle(&anonymous, "/start", &mut notifier)
            .unwrap();

        assert_eq!(notifier.sent, vec![(ADMIN, "New user: @Unknown id=6".to_string())]);
    }

    #[test]
    fn test_update_does_not_merge() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let mut dispatcher = Dispatcher::new(&mut tracker, &mut subs, None);
        dispatcher.handle(&user(5), "/subscribe ua", &mut notifier).unwrap();
        let reply = dispatcher.handle(&user(5), "/update", &mut notifier).unwrap();

        assert!(reply.text.starts_with("🏳ua:"));
        assert!(!reply.text.contains("cz"));
        assert!(tracker.get("ua").unwrap().series().is_empty());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let mut dispatcher = Dispatcher::new(&mut tracker, &mut subs, None);

        let reply = dispatcher.handle(&user(7), "/subscribe: 🏳 cz", &mut notifier).unwrap();
        assert_eq!(reply.text, "Subscribed to cz");
        let reply = dispatcher.handle(&user(7), "/subscribe de", &mut notifier).unwrap();
        assert!(reply.text.starts_with("Unknown location de"));
        let reply = dispatcher.handle(&user(7), "/unsubscribe ua", &mut notifier).unwrap();
        assert_eq!(reply.text, "Not subscribed to ua");
        let reply = dispatcher.handle(&user(7), "/unsubscribe cz", &mut notifier).unwrap();
        assert_eq!(reply.text, "Unsubscribed from cz");

        assert!(subs.recipients("cz").is_empty());
    }

    #[test]
    fn test_bare_commands_list_locales() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let reply = Dispatcher::new(&mut tracker, &mut subs, None)
            .handle(&user(7), "/graph", &mut notifier)
            .unwrap();
        assert_eq!(reply.text, "Choose location to /graph\n/graph: 🏳 cz\n/graph: 🏳 ua\n");
    }

    #[test]
    fn test_graph_returns_three_charts() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let reply = Dispatcher::new(&mut tracker, &mut subs, None)
            .handle(&user(7), "/graph: 🏳 cz", &mut notifier)
            .unwrap();
        assert_eq!(reply.charts.len(), 3);
        assert_eq!(reply.charts[1].title, "CZ positive / tested, %");
    }

    #[test]
    fn test_reload_is_admin_only() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let mut dispatcher = Dispatcher::new(&mut tracker, &mut subs, Some(ADMIN));

        let reply = dispatcher.handle(&user(7), "/reload", &mut notifier).unwrap();
        assert!(reply.is_empty());
        assert_eq!(tracker.get("cz").unwrap().total_tested(), 100);

        let mut dispatcher = Dispatcher::new(&mut tracker, &mut subs, Some(ADMIN));
        let reply = dispatcher.handle(&user(ADMIN), "/reload", &mut notifier).unwrap();
        assert_eq!(reply.text, "Reloaded");
        // the in-memory store never saw the merge done in setup()
        assert_eq!(tracker.get("cz").unwrap().total_tested(), 0);
    }

    #[test]
    fn test_unknown_text_gets_help() {
        let (mut tracker, mut subs) = setup();
        let mut notifier = RecordingNotifier::default();
        let reply = Dispatcher::new(&mut tracker, &mut subs, None)
            .handle(&user(7), "what is this", &mut notifier)
            .unwrap();
        assert_eq!(reply.text, help_text());
    }
}
