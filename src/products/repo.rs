use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::bot::message::Author;

/// A product name looked up through `/say_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProduct {
    pub product_id: String,
    pub product_name: String,
    #[serde(flatten)]
    pub author: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn save_product(&self, product: &SavedProduct) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn save_product(&self, product: &SavedProduct) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, product_id, product_name, chat_id, user_id, username, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&product.product_id)
        .bind(&product.product_name)
        .bind(product.author.chat_id)
        .bind(product.author.user_id)
        .bind(&product.author.username)
        .bind(product.date)
        .execute(&self.db)
        .await
        .context("insert product")?;
        Ok(())
    }
}
