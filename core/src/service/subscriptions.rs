use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::model::subscriber::Subscriber;
use crate::repository::{FileSubscriberRepository, SubscriberRepository};

/// Chat users keyed by id. Every mutation is written through to the store.
pub struct Subscriptions<R: SubscriberRepository = FileSubscriberRepository> {
    users: BTreeMap<i64, Subscriber>,
    repo: R,
}

impl<R: SubscriberRepository> Subscriptions<R> {
    pub fn load(repo: R) -> Result<Self, StoreError> {
        let mut subs = Self {
            users: BTreeMap::new(),
            repo,
        };
        subs.reload()?;
        Ok(subs)
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.users = self
            .repo
            .load()?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let users: Vec<Subscriber> = self.users.values().cloned().collect();
        self.repo.save(&users)
    }

    pub fn get(&self, id: i64) -> Option<&Subscriber> {
        self.users.get(&id)
    }

    /// Registers an unknown user. Returns true if the user is new.
    pub fn checkin(&mut self, id: i64, username: Option<&str>) -> Result<bool, StoreError> {
        if self.users.contains_key(&id) {
            return Ok(false);
        }
        self.users
            .insert(id, Subscriber::new(id, username.map(String::from)));
        self.save()?;
        Ok(true)
    }

    /// Returns false if the user was already subscribed.
    pub fn subscribe(&mut self, id: i64, locale: &str) -> Result<bool, StoreError> {
        let user = self
            .users
            .entry(id)
            .or_insert_with(|| Subscriber::new(id, None));
        let changed = user.subscribe(locale);
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    /// Returns false if the user was not subscribed.
    pub fn unsubscribe(&mut self, id: i64, locale: &str) -> Result<bool, StoreError> {
        let changed = match self.users.get_mut(&id) {
            Some(user) => user.unsubscribe(locale),
            None => false,
        };
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    /// Ids of everyone subscribed to `locale`.
    pub fn recipients(&self, locale: &str) -> Vec<i64> {
        self.users
            .values()
            .filter(|u| u.subscribed(locale))
            .map(|u| u.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
