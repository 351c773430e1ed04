use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{Connection as _, FromRow};

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{marker::UserMarker, Id},
    types::validation::is_valid_username,
};

/// The name of the sentinel identity that adopts orphaned posts.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub display_name: Option<String>,
}

impl User {
    #[tracing::instrument(skip_all, name = "db.users.by_id")]
    pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(condition), name = "db.users.by_name")]
    pub async fn by_name(conn: &mut Connection, condition: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE name = $1"#)
            .bind(condition)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    /// Administrative seam: identities ordinarily come from the
    /// authentication subsystem.
    #[tracing::instrument(skip_all, name = "db.users.create")]
    pub async fn create(conn: &mut Connection, name: &str) -> Result<Self> {
        debug_assert!(is_valid_username(name) || name == ANONYMOUS);

        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "users" (name)
               VALUES ($1)
               RETURNING *"#,
        )
        .bind(name)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Gets or creates the sentinel `anonymous` identity. Safe to
    /// call any number of times, from concurrent transactions too.
    #[tracing::instrument(skip_all, name = "db.users.ensure_anonymous")]
    pub async fn ensure_anonymous(conn: &mut Connection) -> Result<Self> {
        sqlx::query(r#"INSERT INTO "users" (name) VALUES ($1) ON CONFLICT (name) DO NOTHING"#)
            .bind(ANONYMOUS)
            .execute(&mut *conn)
            .await
            .into_db_error()?;

        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE name = $1"#)
            .bind(ANONYMOUS)
            .fetch_one(conn)
            .await
            .into_db_error()
    }

    /// Deletes an identity without leaving tombstone posts behind:
    /// everything they wrote is handed over to the sentinel
    /// `anonymous` identity in the same transaction.
    #[tracing::instrument(skip_all, name = "db.users.delete")]
    pub async fn delete(conn: &mut Connection, id: Id<UserMarker>) -> Result<()> {
        let mut tx = conn.begin().await.into_db_error()?;

        let anonymous = Self::ensure_anonymous(&mut *tx).await?;
        if anonymous.id == id {
            // the sentinel itself is permanent
            tx.rollback().await.into_db_error()?;
            return Ok(());
        }

        sqlx::query(r#"UPDATE "posts" SET author_id = $1 WHERE author_id = $2"#)
            .bind(anonymous.id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        sqlx::query(r#"DELETE FROM "users" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await
            .into_db_error()?;

        tx.commit().await.into_db_error()
    }
}
