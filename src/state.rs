use crate::config::AppConfig;
use crate::profiles::repo::{MemoryProfileStore, PgProfileStore, ProfileStore};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres and applies migrations when `DATABASE_URL` is
    /// set, otherwise falls back to the in-memory store.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres profile store");
                Arc::new(PgProfileStore::new(db)) as Arc<dyn ProfileStore>
            }
            None => {
                warn!("DATABASE_URL not set; profiles are kept in memory only");
                Arc::new(MemoryProfileStore::new()) as Arc<dyn ProfileStore>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn ProfileStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(MemoryProfileStore::new()),
            Arc::new(AppConfig::default()),
        )
    }
}
