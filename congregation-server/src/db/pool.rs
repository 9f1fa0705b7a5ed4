//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. The pool connects
//! lazily, so a handle exists as soon as configuration does.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Maximum connections for the pool.
/// Kept low for a small site backend.
const MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a connection before failing.
/// Bounds every operation against an unreachable database.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a lazily-connecting PostgreSQL pool.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `database_name` - overrides the database named in the URL, if set
///
/// # Errors
///
/// Returns an error if the connection string cannot be parsed. No connection
/// is attempted here.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/congregation", None)?;
/// ```
pub fn create_pool(database_url: &str, database_name: Option<&str>) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if let Some(name) = database_name {
        options = options.database(name);
    }

    Ok(PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(options))
}
