//! HTTP server command

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use congregation_server::db::{DocumentStore, MemoryStore};
use congregation_server::{run_server, AppState};
use tracing::{info, warn};

use super::{open_store, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind (default: $HOST or 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: $PORT or 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep records in an in-memory store instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = args.db.settings(args.host.clone(), args.port)?;
    let config = settings.server_config()?;

    let store: Option<Arc<dyn DocumentStore>> = if args.memory {
        warn!("using in-memory store, records are lost on exit");
        Some(Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>)
    } else {
        match open_store(&settings).await {
            Ok(store) => store,
            Err(e) => {
                warn!("database unavailable, serving without it: {:#}", e);
                None
            }
        }
    };

    info!(
        addr = %config.bind_addr,
        database = store.is_some(),
        "starting congregation API"
    );

    let state = AppState::new(store, settings.collections.clone(), settings.presence);
    run_server(state, config).await.context("Server error")
}
