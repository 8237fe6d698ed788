//! In-process store used when no database is configured, and by tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::items::repo::ItemRepository;
use crate::items::repo_types::{ItemRef, StoredItem, SubmittedItem};
use crate::journal::repo::{LoggedMessage, MessageJournal};
use crate::meals::repo::MealRepository;
use crate::meals::repo_types::{meal_name_key, Meal};
use crate::products::repo::{ProductRepository, SavedProduct};

#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<(ItemRef, SubmittedItem)>>,
    meals: RwLock<Vec<Meal>>,
    products: RwLock<Vec<SavedProduct>>,
    messages: RwLock<Vec<LoggedMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub async fn meals(&self) -> Vec<Meal> {
        self.meals.read().await.clone()
    }

    pub async fn products(&self) -> Vec<SavedProduct> {
        self.products.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<LoggedMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn save(&self, item: &SubmittedItem) -> anyhow::Result<()> {
        self.items
            .write()
            .await
            .push((ItemRef(Uuid::new_v4()), item.clone()));
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<SubmittedItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn delete_by_alias_or_barcode(&self, query: &str) -> anyhow::Result<Option<SubmittedItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let mut items = self.items.write().await;
        let index = items
            .iter()
            .position(|(_, item)| item.alias_key() == Some(query))
            .or_else(|| items.iter().position(|(_, item)| item.barcode == query));
        Ok(index.map(|i| items.remove(i).1))
    }

    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<StoredItem>> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(None);
        }

        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|(_, item)| item.alias_key() == Some(alias))
            .map(|(item_ref, item)| StoredItem {
                item_ref: *item_ref,
                item: item.clone(),
            }))
    }

    async fn replace_at(&self, item_ref: ItemRef, item: &SubmittedItem) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        let Some(slot) = items.iter_mut().find(|(r, _)| *r == item_ref) else {
            return Ok(false);
        };
        slot.1 = item.clone();
        Ok(true)
    }
}

#[async_trait]
impl MealRepository for MemoryStore {
    async fn save(&self, meal: &Meal) -> anyhow::Result<()> {
        let mut meals = self.meals.write().await;
        let key = meal_name_key(&meal.name);
        anyhow::ensure!(
            !meals.iter().any(|m| meal_name_key(&m.name) == key),
            "meal {} already exists",
            meal.name
        );
        meals.push(meal.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Meal>> {
        let key = meal_name_key(name);
        if key.is_empty() {
            return Ok(None);
        }
        Ok(self
            .meals
            .read()
            .await
            .iter()
            .find(|m| meal_name_key(&m.name) == key)
            .cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn save_product(&self, product: &SavedProduct) -> anyhow::Result<()> {
        self.products.write().await.push(product.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageJournal for MemoryStore {
    async fn log_message(&self, entry: &LoggedMessage) -> anyhow::Result<()> {
        self.messages.write().await.push(entry.clone());
        Ok(())
    }
}
