use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::bundle::ChannelBundle;

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::{QueryError, QueryTable};
pub use repositories::harvest::{StoreError, StoreReport, StoreWarning};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & schema applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn harvest_repo(&self) -> repositories::harvest::HarvestRepository {
        repositories::harvest::HarvestRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    /// Full-replace of everything stored for the bundle's channel; see
    /// [`repositories::harvest::HarvestRepository::replace_channel_data`].
    pub async fn replace_channel_data(
        &self,
        bundle: &ChannelBundle,
    ) -> Result<StoreReport, StoreError> {
        self.harvest_repo().replace_channel_data(bundle).await
    }

    pub async fn run_query(&self, name: &str) -> Result<QueryTable, QueryError> {
        self.catalog_repo().run_query(name).await
    }

    pub fn query_names() -> Vec<&'static str> {
        repositories::catalog::CatalogRepository::query_names()
    }
}
