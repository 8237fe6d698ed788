use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::repo::SavedProduct;
use crate::bot::message::InboundMessage;
use crate::catalog::dto::NAME_FIELDS;
use crate::state::AppState;

/// `/say_name <product id>`: look the product up and remember its name.
#[instrument(skip(state, message), fields(conversation_id = message.conversation_id))]
pub async fn say_name(state: &AppState, message: &InboundMessage, product_id: &str) -> anyhow::Result<String> {
    let product_id = product_id.trim();
    if product_id.is_empty() {
        return Ok("Send a product id after the command, e.g. /say_name 737628064502".into());
    }

    let product = match state.catalog.get_product(product_id, NAME_FIELDS).await {
        Ok(product) => product,
        Err(e) => {
            error!(error = %e, %product_id, status = ?e.status(), "product lookup failed");
            return Ok("Could not fetch product for that product id.".into());
        }
    };

    let Some(product) = product else {
        warn!(%product_id, "product not in catalog");
        return Ok("Product not found for that product id.".into());
    };
    let Some(product_name) = product.display_name().map(str::to_string) else {
        warn!(%product_id, code = ?product.code, "product has no display name");
        return Ok("Product not found for that product id.".into());
    };

    state
        .products
        .save_product(&SavedProduct {
            product_id: product_id.to_string(),
            product_name: product_name.clone(),
            author: message.author(),
            date: OffsetDateTime::now_utc(),
        })
        .await?;
    info!(%product_id, %product_name, "product saved");

    Ok(match product.brands {
        Some(brands) => format!("Product: {product_name} ({brands})"),
        None => format!("Product: {product_name}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProduct;
    use crate::testing::{catalog_product, text_message, FakeCatalog, FakeDecoder, CHAT_ID};
    use std::sync::Arc;

    fn state(catalog: FakeCatalog) -> (AppState, Arc<crate::memory::MemoryStore>, Arc<FakeCatalog>) {
        let catalog = Arc::new(catalog);
        let (state, store) = AppState::fake(catalog.clone(), Arc::new(FakeDecoder::returning(None)));
        (state, store, catalog)
    }

    #[tokio::test]
    async fn saves_product_and_names_brand() {
        let product = CatalogProduct {
            brands: Some("Acme".into()),
            ..catalog_product("Peanut Butter", 25.0, 590.0)
        };
        let (state, store, _) = state(FakeCatalog::default().with("737628064502", product));

        let reply = say_name(&state, &text_message(CHAT_ID, ""), " 737628064502 ")
            .await
            .unwrap();
        assert_eq!(reply, "Product: Peanut Butter (Acme)");

        let saved = store.products().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].product_id, "737628064502");
        assert_eq!(saved[0].author.chat_id, CHAT_ID);
    }

    #[tokio::test]
    async fn missing_name_is_not_found() {
        let nameless = CatalogProduct {
            code: Some("1".into()),
            ..CatalogProduct::default()
        };
        let (state, store, _) = state(FakeCatalog::default().with("12345678", nameless));

        let reply = say_name(&state, &text_message(CHAT_ID, ""), "12345678").await.unwrap();
        assert_eq!(reply, "Product not found for that product id.");
        assert!(store.products().await.is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_is_reported() {
        let (state, _, catalog) = state(FakeCatalog::default());
        catalog.set_failing(true);

        let reply = say_name(&state, &text_message(CHAT_ID, ""), "12345678").await.unwrap();
        assert_eq!(reply, "Could not fetch product for that product id.");
    }

    #[tokio::test]
    async fn empty_id_asks_for_one() {
        let (state, _, catalog) = state(FakeCatalog::default());
        let reply = say_name(&state, &text_message(CHAT_ID, ""), "  ").await.unwrap();
        assert!(reply.starts_with("Send a product id"));
        assert!(catalog.calls().is_empty());
    }
}
