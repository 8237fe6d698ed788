use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMessage {
    /// Chat-side message id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[async_trait]
pub trait MessageJournal: Send + Sync {
    async fn log_message(&self, entry: &LoggedMessage) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgMessageJournal {
    db: PgPool,
}

impl PgMessageJournal {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageJournal for PgMessageJournal {
    async fn log_message(&self, entry: &LoggedMessage) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, message_id, chat_id, user_id, username, first_name, text, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.id)
        .bind(entry.chat_id)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(&entry.first_name)
        .bind(&entry.text)
        .bind(entry.date)
        .execute(&self.db)
        .await
        .context("insert logged message")?;
        Ok(())
    }
}
