pub mod admin;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use congregation_server::db::{create_pool, DocumentStore, PgDocumentStore};

use crate::config::{Overrides, Settings};

/// Connection flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Config file (default: ./congregation.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// PostgreSQL connection URL (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Database to use instead of the one named in the URL (overrides DATABASE_NAME)
    #[arg(long)]
    pub database_name: Option<String>,
}

impl DatabaseArgs {
    pub fn settings(&self, host: Option<String>, port: Option<u16>) -> Result<Settings> {
        let overrides = Overrides {
            host,
            port,
            database_url: self.database_url.clone(),
            database_name: self.database_name.clone(),
        };
        Settings::load(self.config.as_deref(), overrides)
    }
}

/// Open the configured PostgreSQL store, or `None` when no URL is set.
///
/// Never waits on the database: the pool connects lazily and the table
/// bootstrap runs in the background. The store retries it on first use if
/// the database is not up yet.
pub async fn open_store(settings: &Settings) -> Result<Option<Arc<dyn DocumentStore>>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };

    let pool = create_pool(url, settings.database_name.as_deref()).context("Invalid database URL")?;
    let store = PgDocumentStore::new(pool);

    let warmup = store.clone();
    tokio::spawn(async move {
        if let Err(e) = warmup.ensure_schema().await {
            tracing::warn!(error = %e, "could not prepare the documents table, will retry on first use");
        }
    });

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    Ok(Some(store))
}

/// Like [`open_store`], but the database is mandatory.
pub async fn require_store(settings: &Settings) -> Result<Arc<dyn DocumentStore>> {
    open_store(settings)
        .await?
        .context("No database configured: set DATABASE_URL or pass --database-url")
}
