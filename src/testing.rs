//! Fakes and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;

use crate::barcode::BarcodeDecoder;
use crate::bot::message::{Author, InboundMessage};
use crate::catalog::{CatalogError, CatalogLookup, CatalogProduct};
use crate::images::ImageStore;
use crate::items::repo_types::{NutritionFacts, SubmittedItem};
use crate::meals::repo_types::{Meal, MealIngredient};

pub const CHAT_ID: i64 = 123;

pub fn text_message(conversation_id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        conversation_id,
        message_id: Some(10),
        sender_id: Some(42),
        sender_handle: Some("allowed_user".into()),
        sender_first_name: Some("Test".into()),
        text: Some(text.to_string()),
        image: None,
        timestamp: OffsetDateTime::now_utc(),
    }
}

pub fn image_message(conversation_id: i64, bytes: Vec<u8>) -> InboundMessage {
    InboundMessage {
        text: None,
        image: Some(serde_bytes::ByteBuf::from(bytes)),
        ..text_message(conversation_id, "")
    }
}

pub fn author() -> Author {
    Author {
        chat_id: CHAT_ID,
        user_id: Some(42),
        username: Some("allowed_user".into()),
    }
}

pub fn sample_item(barcode: &str, name: &str) -> SubmittedItem {
    SubmittedItem {
        barcode: barcode.to_string(),
        product_name: name.to_string(),
        nutrition_facts: NutritionFacts::default(),
        alias: None,
        brand: None,
        quantity: None,
        author: author(),
        date: OffsetDateTime::now_utc(),
    }
}

pub fn sample_ingredient(barcode: &str, amount: f64) -> MealIngredient {
    MealIngredient {
        barcode: barcode.to_string(),
        alias: None,
        product_name: format!("Item {barcode}"),
        quantity: None,
        amount,
        proteins_100g: None,
        energy_kcal_100g: None,
    }
}

pub fn sample_meal(name: &str) -> Meal {
    Meal {
        name: name.to_string(),
        ingredients: vec![sample_ingredient("1", 100.0)],
        total_protein: 0.0,
        total_calories: 0.0,
        author: author(),
        date: OffsetDateTime::now_utc(),
    }
}

pub fn catalog_product(name: &str, protein: f64, kcal: f64) -> CatalogProduct {
    CatalogProduct {
        product_name: Some(name.to_string()),
        nutrition_facts: NutritionFacts {
            proteins_100g: Some(protein),
            energy_kcal_100g: Some(kcal),
            ..NutritionFacts::default()
        },
        ..CatalogProduct::default()
    }
}

/// Catalog answering from a fixed table; can be switched to fail.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<String, CatalogProduct>>,
    failing: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with(self, id: &str, product: CatalogProduct) -> Self {
        self.products.lock().unwrap().insert(id.to_string(), product);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogLookup for FakeCatalog {
    async fn get_product(
        &self,
        identifier: &str,
        _fields: &[&str],
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        self.calls.lock().unwrap().push(identifier.to_string());
        if *self.failing.lock().unwrap() {
            return Err(CatalogError::Request {
                status: Some(503),
                url: format!("fake://{identifier}"),
                message: "unavailable".into(),
            });
        }
        Ok(self.products.lock().unwrap().get(identifier).cloned())
    }
}

pub struct FakeDecoder {
    result: Option<String>,
    fail: bool,
}

impl FakeDecoder {
    pub fn returning(result: Option<&str>) -> Self {
        Self {
            result: result.map(str::to_string),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            fail: true,
        }
    }
}

#[async_trait]
impl BarcodeDecoder for FakeDecoder {
    async fn decode(&self, _image: &[u8]) -> anyhow::Result<Option<String>> {
        if self.fail {
            anyhow::bail!("decoder unavailable");
        }
        Ok(self.result.clone())
    }
}

/// Image store keeping `(key, content type)` pairs in memory.
#[derive(Default)]
pub struct FakeImageStore {
    stored: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl FakeImageStore {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn stored(&self) -> Vec<(String, String)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn put_object(&self, key: &str, _body: Bytes, content_type: &str) -> anyhow::Result<String> {
        if *self.failing.lock().unwrap() {
            anyhow::bail!("disk full");
        }
        self.stored
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(format!("fake://{key}"))
    }
}
