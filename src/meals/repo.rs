use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Meal, MealIngredient};
use crate::bot::message::Author;

#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn save(&self, meal: &Meal) -> anyhow::Result<()>;
    /// Case-insensitive match on the trimmed name.
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Meal>>;
}

#[derive(Debug, FromRow)]
struct MealRow {
    name: String,
    ingredients: Json<Vec<MealIngredient>>,
    total_protein: f64,
    total_calories: f64,
    chat_id: i64,
    user_id: Option<i64>,
    username: Option<String>,
    date: OffsetDateTime,
}

impl From<MealRow> for Meal {
    fn from(r: MealRow) -> Self {
        Self {
            name: r.name,
            ingredients: r.ingredients.0,
            total_protein: r.total_protein,
            total_calories: r.total_calories,
            author: Author {
                chat_id: r.chat_id,
                user_id: r.user_id,
                username: r.username,
            },
            date: r.date,
        }
    }
}

#[derive(Clone)]
pub struct PgMealRepository {
    db: PgPool,
}

impl PgMealRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealRepository for PgMealRepository {
    async fn save(&self, meal: &Meal) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meals
                (id, name, ingredients, total_protein, total_calories,
                 chat_id, user_id, username, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&meal.name)
        .bind(Json(&meal.ingredients))
        .bind(meal.total_protein)
        .bind(meal.total_calories)
        .bind(meal.author.chat_id)
        .bind(meal.author.user_id)
        .bind(&meal.author.username)
        .bind(meal.date)
        .execute(&self.db)
        .await
        .context("insert meal")?;
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Meal>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT name, ingredients, total_protein, total_calories,
                   chat_id, user_id, username, date
              FROM meals
             WHERE lower(btrim(name)) = lower($1)
             ORDER BY seq ASC
             LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .context("find meal by name")?;
        Ok(row.map(Meal::from))
    }
}
