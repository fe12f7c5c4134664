use std::ops::{Deref, DerefMut};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use sqlx::migrate::MigrateDatabase;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection};

use crate::config::DatabaseConfig;
use crate::domain::TodoError;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Owns the connection pool. Cheap to clone; every clone shares the pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates the database if needed, opens the pool and makes sure the
    /// schema exists. Errors here should stop the process before it serves.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, TodoError> {
        if !Sqlite::database_exists(&config.url).await? {
            #[cfg(feature = "tracing")]
            info!(url = %config.url, "Creating database");
            Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        let database = Self { pool };
        database.initialize_schema().await?;

        #[cfg(feature = "tracing")]
        info!(url = %config.url, max_connections = config.max_connections, "Database ready");
        Ok(database)
    }

    pub async fn initialize_schema(&self) -> Result<(), TodoError> {
        // AUTOINCREMENT gives the table a row in sqlite_sequence, which is
        // what gets reset once the table is emptied.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                completed BOOLEAN NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Checks out one connection for the duration of a request.
    pub async fn acquire(&self) -> Result<Session, TodoError> {
        let conn = self.pool.acquire().await?;
        Ok(Session(conn))
    }

    pub async fn close(&self) {
        #[cfg(feature = "tracing")]
        debug!("Closing database pool");
        self.pool.close().await;
    }
}

/// A pooled connection scoped to one request. Dropping it hands the
/// connection back to the pool.
pub struct Session(PoolConnection<Sqlite>);

impl Deref for Session {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        &self.0
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for Session
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = TodoError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Database::from_ref(state).acquire().await
    }
}
