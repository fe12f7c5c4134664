//! CRUD operations on the `todos` table.
//!
//! Every function runs against the caller's session (one pooled connection).
//! Writes are single autocommitted statements so SQLite's busy timeout
//! applies when requests contend for the write lock. `RETURNING` writes are
//! drained with `fetch_all` so the statement completes and commits.
//! Lookups by id return `Option` and leave the not-found decision to the
//! caller.

use sqlx::SqliteConnection;

use crate::domain::{NewTodo, Todo, TodoError, TodoPatch};

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Todo>, TodoError> {
    let todos = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, completed FROM todos ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(todos)
}

#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn get_one(conn: &mut SqliteConnection, id: i64) -> Result<Option<Todo>, TodoError> {
    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, completed FROM todos WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(todo)
}

#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn create(conn: &mut SqliteConnection, new: NewTodo) -> Result<Todo, TodoError> {
    let todo = sqlx::query_as::<_, Todo>(
        "INSERT INTO todos (title, description, completed) VALUES (?, ?, ?)
         RETURNING id, title, description, completed",
    )
    .bind(new.title)
    .bind(new.description)
    .bind(new.completed)
    .fetch_all(&mut *conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;

    #[cfg(feature = "tracing")]
    debug!(id = todo.id, "Todo created");
    Ok(todo)
}

/// Applies the fields present in `patch` in one statement, so the write lock
/// is taken up front rather than upgraded from a read.
#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    patch: TodoPatch,
) -> Result<Option<Todo>, TodoError> {
    if patch.is_empty() {
        return get_one(conn, id).await;
    }

    let clear_or_set_description = patch.description.is_some();
    let todo = sqlx::query_as::<_, Todo>(
        "UPDATE todos SET
            title = COALESCE(?, title),
            description = CASE WHEN ? THEN ? ELSE description END,
            completed = COALESCE(?, completed)
         WHERE id = ?
         RETURNING id, title, description, completed",
    )
    .bind(patch.title)
    .bind(clear_or_set_description)
    .bind(patch.description.flatten())
    .bind(patch.completed)
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .pop();

    #[cfg(feature = "tracing")]
    {
        if let Some(todo) = &todo {
            debug!(id = todo.id, "Todo updated");
        }
    }
    Ok(todo)
}

/// Deletes the row and returns its last known value. The returned id no
/// longer refers to anything once this returns.
#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<Option<Todo>, TodoError> {
    let todo = sqlx::query_as::<_, Todo>(
        "DELETE FROM todos WHERE id = ? RETURNING id, title, description, completed",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .pop();
    let Some(todo) = todo else {
        return Ok(None);
    };

    #[cfg(feature = "tracing")]
    debug!(id, "Todo deleted");

    // Separate commit: an insert landing between the two is not covered.
    reset_sequence_if_empty(conn).await?;
    Ok(Some(todo))
}

/// Restarts the id sequence at 1 when no todos are left. Returns whether the
/// reset happened.
#[cfg_attr(feature = "tracing", instrument(skip(conn)))]
pub async fn reset_sequence_if_empty(conn: &mut SqliteConnection) -> Result<bool, TodoError> {
    let result = sqlx::query(
        "DELETE FROM sqlite_sequence
         WHERE name = 'todos' AND NOT EXISTS (SELECT 1 FROM todos)",
    )
    .execute(&mut *conn)
    .await?;
    let reset = result.rows_affected() > 0;

    #[cfg(feature = "tracing")]
    {
        if reset {
            info!("Todo table empty, id sequence restarted at 1");
        }
    }
    Ok(reset)
}
