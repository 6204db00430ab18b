//! Postgres-backed user and note stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | Store error |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `UserStoreError::Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / network / decode | N/A | `Backend` |
//!
//! A missing row on lookup is reported as `UserStoreError::NotFound`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;

use notekeeper_auth::{NewUser, UserStore, UserStoreError};
use notekeeper_core::{Note, NoteId, User, UserId};
use notekeeper_notes::{NewNote, NoteStore, NoteStoreError};

use crate::config::PostgresConfig;

const UNIQUE_VIOLATION: &str = "23505";

/// Open a connection pool and check connectivity.
pub async fn connect(cfg: &PostgresConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .idle_timeout(Some(Duration::from_secs(cfg.idle_timeout_secs)))
        .connect(&cfg.dsn)
        .await
}

/// Create the tables this service needs if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id         BIGSERIAL PRIMARY KEY,
            username   TEXT NOT NULL UNIQUE,
            password   BYTEA NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id      BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users (id),
            title   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS notes_user_id_idx ON notes (user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == UNIQUE_VIOLATION;
        }
    }
    false
}

fn map_user_error(operation: &str, err: sqlx::Error) -> UserStoreError {
    if is_unique_violation(&err) {
        return UserStoreError::Duplicate;
    }
    UserStoreError::Backend(format!("sqlx error in {operation}: {err}"))
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_i64(row.try_get::<i64, _>("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Postgres-backed user store (`users` table).
///
/// Uniqueness of `username` is enforced by the table's UNIQUE constraint.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip_all, fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<UserId, UserStoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_user_error("create_user", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_user_error("create_user", e))?;
        Ok(UserId::from_i64(id))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_user_error("find_by_username", e))?
        .ok_or(UserStoreError::NotFound)?;

        user_from_row(&row).map_err(|e| map_user_error("find_by_username", e))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_user_error("find_by_id", e))?
        .ok_or(UserStoreError::NotFound)?;

        user_from_row(&row).map_err(|e| map_user_error("find_by_id", e))
    }
}

/// Postgres-backed note store (`notes` table).
#[derive(Debug, Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_note_error(operation: &str, err: sqlx::Error) -> NoteStoreError {
    NoteStoreError::Backend(format!("sqlx error in {operation}: {err}"))
}

#[async_trait]
impl NoteStore for PgNoteStore {
    #[instrument(skip_all, fields(user_id = %note.user_id))]
    async fn create_note(&self, note: NewNote) -> Result<NoteId, NoteStoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO notes (user_id, title)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(note.user_id.as_i64())
        .bind(&note.title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_note_error("create_note", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_note_error("create_note", e))?;
        Ok(NoteId::from_i64(id))
    }

    #[instrument(skip(self))]
    async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title
            FROM notes
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_note_error("list_notes", e))?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            notes.push(Note {
                id: NoteId::from_i64(row.try_get("id").map_err(|e| map_note_error("list_notes", e))?),
                user_id: UserId::from_i64(
                    row.try_get("user_id")
                        .map_err(|e| map_note_error("list_notes", e))?,
                ),
                title: row
                    .try_get("title")
                    .map_err(|e| map_note_error("list_notes", e))?,
            });
        }

        Ok(notes)
    }
}
