
use tempfile::TempDir;

use crate::config::DatabaseConfig;
use crate::storage::Database;

/// Fresh database file per test. Keep the `TempDir` alive for the test's
/// duration or the file disappears under the pool.
pub(crate) async fn test_database() -> (Database, TempDir) {
    test_database_with_pool(2).await
}

pub(crate) async fn test_database_with_pool(max_connections: u32) -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("todos.db").display());
    let database = Database::connect(&DatabaseConfig {
        url,
        max_connections,
    })
    .await
    .expect("database");
    (database, dir)
}
