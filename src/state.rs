use crate::config::{AppConfig, StorageBackend};
use crate::users::{memory::InMemoryUserRepo, repo::PgUserRepo, repo::UserRepository};
use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};
use std::sync::Arc;

/// Creates the `users` table and the unique constraints the store relies on.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = match config.storage {
            StorageBackend::Postgres => {
                let db = config
                    .database
                    .as_ref()
                    .context("postgres storage selected without database settings")?;
                let pool = PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .connect(&db.url)
                    .await
                    .context("connect to database")?;

                MIGRATOR.run(&pool).await.context("run migrations")?;

                Arc::new(PgUserRepo::new(pool)) as Arc<dyn UserRepository>
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory user storage; records are lost on restart");
                Arc::new(InMemoryUserRepo::new()) as Arc<dyn UserRepository>
            }
        };

        Ok(Self::from_parts(users, config))
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            storage: StorageBackend::Memory,
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(InMemoryUserRepo::new()), config)
    }
}
