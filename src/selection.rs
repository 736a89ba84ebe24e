//! # Selection State
//!
//! Per-user ingredient toggles for the ingredient picker. The store is an owned
//! value shared through `Arc`, so every test builds an isolated instance and a
//! retention policy can be layered on top of `evict` without touching handlers.
//!
//! Entries are created when a user opens the picker or toggles a button and are
//! kept until evicted; nothing expires on its own.

use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

/// Telegram user identifier
pub type UserKey = u64;

/// Thread-safe map from user to the ingredient flags shown in their picker
#[derive(Debug, Default)]
pub struct SelectionStore {
    users: Mutex<HashMap<UserKey, HashMap<String, bool>>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag for `(user, ingredient)`, creating the user's entry if needed.
    ///
    /// Returns the new state of the flag.
    pub async fn toggle(&self, user: UserKey, ingredient: &str) -> bool {
        let mut users = self.users.lock().await;
        let flags = users.entry(user).or_default();
        let flag = flags.entry(ingredient.to_string()).or_insert(false);
        *flag = !*flag;

        debug!(user_id = user, ingredient = %ingredient, selected = *flag, "Toggled ingredient");
        *flag
    }

    /// Names currently flagged for `user`; an unknown user has an empty selection
    pub async fn selected(&self, user: UserKey) -> BTreeSet<String> {
        let users = self.users.lock().await;
        users
            .get(&user)
            .map(|flags| {
                flags
                    .iter()
                    .filter(|(_, selected)| **selected)
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Re-initialize the user's entry to all-false over the given ingredient listing
    pub async fn reset<I, S>(&self, user: UserKey, known_ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags: HashMap<String, bool> = known_ingredients
            .into_iter()
            .map(|name| (name.into(), false))
            .collect();

        debug!(user_id = user, known = flags.len(), "Reset ingredient selection");
        self.users.lock().await.insert(user, flags);
    }

    /// Drop the user's entry entirely. Returns whether an entry existed.
    pub async fn evict(&self, user: UserKey) -> bool {
        self.users.lock().await.remove(&user).is_some()
    }

    /// Number of users with an entry, selected or not
    pub async fn tracked_users(&self) -> usize {
        self.users.lock().await.len()
    }
}
