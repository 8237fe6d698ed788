use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::items::repo_types::{ItemRef, PendingItem};
use crate::meals::repo_types::MealIngredient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    #[default]
    Idle,
    AwaitingInput,
    AwaitingAlias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMode {
    #[default]
    Create,
    /// Overwrite the item found by alias when the flow started.
    Update(ItemRef),
}

/// Item submission / update flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFlow {
    pub state: ItemState,
    pub mode: ItemMode,
    pub pending: Option<PendingItem>,
}

impl ItemFlow {
    pub fn awaiting_input(mode: ItemMode) -> Self {
        Self {
            state: ItemState::AwaitingInput,
            mode,
            pending: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != ItemState::Idle
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealState {
    #[default]
    Idle,
    Collecting,
}

/// Meal composition flow. Ingredients are unique by barcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealFlow {
    pub state: MealState,
    pub name: Option<String>,
    pub ingredients: Vec<MealIngredient>,
}

impl MealFlow {
    pub fn collecting(name: String) -> Self {
        Self {
            state: MealState::Collecting,
            name: Some(name),
            ingredients: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == MealState::Collecting
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace any entry with the same barcode; the newest goes last.
    pub fn upsert(&mut self, ingredient: MealIngredient) {
        self.ingredients.retain(|i| i.barcode != ingredient.barcode);
        self.ingredients.push(ingredient);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub item: ItemFlow,
    pub meal: MealFlow,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            item: ItemFlow::default(),
            meal: MealFlow::default(),
            last_activity: OffsetDateTime::now_utc(),
        }
    }
}

impl Session {
    pub fn has_active_flow(&self) -> bool {
        self.item.is_active() || self.meal.is_active()
    }

    pub fn is_expired(&self, now: OffsetDateTime, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Drops both flows when they have been left untouched past `timeout`.
    /// Returns whether anything was discarded.
    pub fn expire_if_idle(&mut self, now: OffsetDateTime, timeout: Option<Duration>) -> bool {
        let Some(timeout) = timeout else {
            return false;
        };
        if !self.has_active_flow() || !self.is_expired(now, timeout) {
            return false;
        }
        self.item.reset();
        self.meal.reset();
        true
    }

    pub fn touch(&mut self, now: OffsetDateTime) {
        self.last_activity = now;
    }
}

/// One session per conversation.
///
/// A checked-out session stays locked until the guard drops, which
/// serializes message handling per conversation.
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub async fn checkout(&self, conversation_id: i64) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .entry(conversation_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Forget sessions idle past the timeout. Sessions currently being
    /// handled are skipped.
    pub async fn sweep(&self, now: OffsetDateTime) -> usize {
        let Some(timeout) = self.idle_timeout else {
            return 0;
        };
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        // A slot referenced outside the map is checked out or about to be.
        sessions.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => !session.is_expired(now, timeout),
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Sweep idle sessions every `every` until the task is aborted.
pub fn spawn_sweeper(sessions: Arc<SessionStore>, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let dropped = sessions.sweep(OffsetDateTime::now_utc()).await;
            if dropped > 0 {
                let remaining = sessions.len().await;
                debug!(dropped, remaining, "idle sessions swept");
            }
        }
    })
}
