use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ItemRef, NutritionFacts, StoredItem, SubmittedItem};
use crate::bot::message::Author;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Append a new item at the end of the list.
    async fn save(&self, item: &SubmittedItem) -> anyhow::Result<()>;
    /// All items in submission order.
    async fn list(&self) -> anyhow::Result<Vec<SubmittedItem>>;
    /// Remove the first item whose trimmed alias equals `query`, or failing
    /// that the first item with that barcode.
    async fn delete_by_alias_or_barcode(&self, query: &str) -> anyhow::Result<Option<SubmittedItem>>;
    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<StoredItem>>;
    /// Overwrite the item at `item_ref`, keeping its position. `false` when
    /// the item is gone.
    async fn replace_at(&self, item_ref: ItemRef, item: &SubmittedItem) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct SubmittedItemRow {
    id: Uuid,
    barcode: String,
    product_name: String,
    nutrition_facts: Json<NutritionFacts>,
    alias: Option<String>,
    brand: Option<String>,
    quantity: Option<String>,
    chat_id: i64,
    user_id: Option<i64>,
    username: Option<String>,
    date: OffsetDateTime,
}

impl From<SubmittedItemRow> for StoredItem {
    fn from(r: SubmittedItemRow) -> Self {
        Self {
            item_ref: ItemRef(r.id),
            item: SubmittedItem {
                barcode: r.barcode,
                product_name: r.product_name,
                nutrition_facts: r.nutrition_facts.0,
                alias: r.alias,
                brand: r.brand,
                quantity: r.quantity,
                author: Author {
                    chat_id: r.chat_id,
                    user_id: r.user_id,
                    username: r.username,
                },
                date: r.date,
            },
        }
    }
}

const ITEM_COLUMNS: &str = "id, barcode, product_name, nutrition_facts, alias, brand, quantity, \
                            chat_id, user_id, username, date";

#[derive(Clone)]
pub struct PgItemRepository {
    db: PgPool,
}

impl PgItemRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn save(&self, item: &SubmittedItem) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO submitted_items
                (id, barcode, product_name, nutrition_facts, alias, brand, quantity,
                 chat_id, user_id, username, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&item.barcode)
        .bind(&item.product_name)
        .bind(Json(item.nutrition_facts))
        .bind(&item.alias)
        .bind(&item.brand)
        .bind(&item.quantity)
        .bind(item.author.chat_id)
        .bind(item.author.user_id)
        .bind(&item.author.username)
        .bind(item.date)
        .execute(&self.db)
        .await
        .context("insert submitted item")?;
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<SubmittedItem>> {
        let rows = sqlx::query_as::<_, SubmittedItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM submitted_items ORDER BY seq ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list submitted items")?;
        Ok(rows.into_iter().map(|r| StoredItem::from(r).item).collect())
    }

    async fn delete_by_alias_or_barcode(&self, query: &str) -> anyhow::Result<Option<SubmittedItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, SubmittedItemRow>(&format!(
            r#"
            DELETE FROM submitted_items
             WHERE id = (
                SELECT id FROM submitted_items
                 WHERE btrim(alias) = $1 OR barcode = $1
                 ORDER BY (btrim(alias) = $1) IS TRUE DESC, seq ASC
                 LIMIT 1
             )
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(query)
        .fetch_optional(&self.db)
        .await
        .context("delete submitted item")?;
        Ok(row.map(|r| StoredItem::from(r).item))
    }

    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<StoredItem>> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, SubmittedItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM submitted_items WHERE btrim(alias) = $1 ORDER BY seq ASC LIMIT 1"
        ))
        .bind(alias)
        .fetch_optional(&self.db)
        .await
        .context("find submitted item by alias")?;
        Ok(row.map(StoredItem::from))
    }

    async fn replace_at(&self, item_ref: ItemRef, item: &SubmittedItem) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE submitted_items
               SET barcode = $2, product_name = $3, nutrition_facts = $4, alias = $5,
                   brand = $6, quantity = $7, chat_id = $8, user_id = $9, username = $10,
                   date = $11
             WHERE id = $1
            "#,
        )
        .bind(item_ref.0)
        .bind(&item.barcode)
        .bind(&item.product_name)
        .bind(Json(item.nutrition_facts))
        .bind(&item.alias)
        .bind(&item.brand)
        .bind(&item.quantity)
        .bind(item.author.chat_id)
        .bind(item.author.user_id)
        .bind(&item.author.username)
        .bind(item.date)
        .execute(&self.db)
        .await
        .context("update submitted item")?;

        Ok(result.rows_affected() == 1)
    }
}
