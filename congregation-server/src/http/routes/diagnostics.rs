//! Diagnostics endpoint - GET /test
//!
//! Checks are tagged results; they are rendered to the status strings
//! existing consumers read only at the response boundary. Never fails.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Most collection names reported
pub const COLLECTIONS_LIMIT: usize = 10;

/// Error text is cut to this many characters
const ERROR_PREVIEW_CHARS: usize = 50;

/// Outcome of one diagnostic check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetStatus<T = ()> {
    Ok(T),
    /// Present but failing
    Degraded(String),
    Unavailable,
}

impl FacetStatus {
    fn from_flag(set: bool) -> Self {
        if set {
            Self::Ok(())
        } else {
            Self::Unavailable
        }
    }

    fn render_flag(&self) -> String {
        match self {
            Self::Ok(()) => "✅ Set".into(),
            Self::Degraded(_) | Self::Unavailable => "❌ Not Set".into(),
        }
    }
}

/// All checks for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// Collection names when the store answers
    pub database: FacetStatus<Vec<String>>,
    pub database_url: FacetStatus,
    pub database_name: FacetStatus,
}

impl Diagnostics {
    pub async fn collect(state: &AppState) -> Self {
        let database = match state.store() {
            None => FacetStatus::Unavailable,
            Some(store) => match store.list_collections(COLLECTIONS_LIMIT).await {
                Ok(names) => FacetStatus::Ok(names),
                Err(e) => {
                    tracing::warn!(error = %e, "listing collections failed");
                    FacetStatus::Degraded(e.to_string())
                }
            },
        };

        let presence = state.presence();
        Self {
            database,
            database_url: FacetStatus::from_flag(presence.database_url),
            database_name: FacetStatus::from_flag(presence.database_name),
        }
    }

    pub fn render(self) -> DiagnosticsResponse {
        let connection_status = match self.database {
            FacetStatus::Unavailable => "Not Connected",
            _ => "Connected",
        };

        let (database, collections) = match self.database {
            FacetStatus::Ok(names) => ("✅ Connected & Working".to_string(), names),
            FacetStatus::Degraded(error) => {
                let preview: String = error.chars().take(ERROR_PREVIEW_CHARS).collect();
                (format!("⚠️  Connected but Error: {}", preview), Vec::new())
            }
            FacetStatus::Unavailable => ("⚠️  Available but not initialized".to_string(), Vec::new()),
        };

        DiagnosticsResponse {
            backend: "✅ Running".into(),
            database,
            database_url: self.database_url.render_flag(),
            database_name: self.database_name.render_flag(),
            connection_status: connection_status.into(),
            collections,
        }
    }
}

/// Diagnostics as served
#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// GET /test
#[instrument(skip(state))]
async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    Json(Diagnostics::collect(&state).await.render())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/test", get(diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_database_renders_legacy_strings() {
        let report = Diagnostics {
            database: FacetStatus::Unavailable,
            database_url: FacetStatus::Unavailable,
            database_name: FacetStatus::Ok(()),
        }
        .render();

        assert_eq!(report.database, "⚠️  Available but not initialized");
        assert_eq!(report.connection_status, "Not Connected");
        assert_eq!(report.database_url, "❌ Not Set");
        assert_eq!(report.database_name, "✅ Set");
        assert!(report.collections.is_empty());
    }

    #[test]
    fn degraded_database_truncates_error() {
        let report = Diagnostics {
            database: FacetStatus::Degraded("é".repeat(80)),
            database_url: FacetStatus::Ok(()),
            database_name: FacetStatus::Ok(()),
        }
        .render();

        assert_eq!(report.connection_status, "Connected");
        assert_eq!(
            report.database,
            format!("⚠️  Connected but Error: {}", "é".repeat(50))
        );
    }

    #[test]
    fn working_database_lists_collections() {
        let report = Diagnostics {
            database: FacetStatus::Ok(vec!["galleryimage".into()]),
            database_url: FacetStatus::Ok(()),
            database_name: FacetStatus::Ok(()),
        }
        .render();

        assert_eq!(report.database, "✅ Connected & Working");
        assert_eq!(report.collections, vec!["galleryimage"]);
    }
}
