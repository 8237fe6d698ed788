use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::barcode::{BarcodeDecoder, HttpBarcodeDecoder, UnavailableDecoder};
use crate::bot::session::SessionStore;
use crate::catalog::{CatalogLookup, OpenFoodFactsClient};
use crate::config::AppConfig;
use crate::images::{ImageStore, LocalImageStore};
use crate::items::repo::{ItemRepository, PgItemRepository};
use crate::journal::repo::{MessageJournal, PgMessageJournal};
use crate::meals::repo::{MealRepository, PgMealRepository};
use crate::memory::MemoryStore;
use crate::products::repo::{PgProductRepository, ProductRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Option<PgPool>,
    pub items: Arc<dyn ItemRepository>,
    pub meals: Arc<dyn MealRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub journal: Arc<dyn MessageJournal>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub decoder: Arc<dyn BarcodeDecoder>,
    pub images: Arc<dyn ImageStore>,
    pub sessions: Arc<SessionStore>,
}

/// Storage ports, all backed by the same store.
pub struct Stores {
    pub items: Arc<dyn ItemRepository>,
    pub meals: Arc<dyn MealRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub journal: Arc<dyn MessageJournal>,
}

impl Stores {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            items: Arc::new(PgItemRepository::new(db.clone())),
            meals: Arc::new(PgMealRepository::new(db.clone())),
            products: Arc::new(PgProductRepository::new(db.clone())),
            journal: Arc::new(PgMessageJournal::new(db)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            items: store.clone(),
            meals: store.clone(),
            products: store.clone(),
            journal: store,
        }
    }
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (db, stores) = match &config.database_url {
            Some(url) => {
                let db = crate::db::connect(url).await?;
                info!("using postgres storage");
                (Some(db.clone()), Stores::postgres(db))
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory storage, data is lost on restart");
                (None, Stores::memory(Arc::new(MemoryStore::new())))
            }
        };

        let catalog = Arc::new(OpenFoodFactsClient::new(&config.catalog)?) as Arc<dyn CatalogLookup>;
        let decoder = match &config.barcode_decoder_url {
            Some(url) => {
                Arc::new(HttpBarcodeDecoder::new(url, config.barcode_decoder_timeout())?) as Arc<dyn BarcodeDecoder>
            }
            None => {
                warn!("BARCODE_DECODER_URL not set; barcode images cannot be read");
                Arc::new(UnavailableDecoder) as Arc<dyn BarcodeDecoder>
            }
        };

        let images = Arc::new(LocalImageStore::new(&config.image_save_dir)) as Arc<dyn ImageStore>;

        Ok(Self::from_parts(config, db, stores, catalog, decoder, images))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        db: Option<PgPool>,
        stores: Stores,
        catalog: Arc<dyn CatalogLookup>,
        decoder: Arc<dyn BarcodeDecoder>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_idle_timeout()));
        Self {
            config,
            db,
            items: stores.items,
            meals: stores.meals,
            products: stores.products,
            journal: stores.journal,
            catalog,
            decoder,
            images,
            sessions,
        }
    }

    #[cfg(test)]
    pub fn fake(
        catalog: Arc<crate::testing::FakeCatalog>,
        decoder: Arc<dyn BarcodeDecoder>,
    ) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(AppConfig {
            webhook_secret: Some("test-secret".into()),
            ..AppConfig::default()
        });
        let state = Self::from_parts(
            config,
            None,
            Stores::memory(store.clone()),
            catalog,
            decoder,
            Arc::new(crate::testing::FakeImageStore::default()),
        );
        (state, store)
    }
}
