use serde::Serialize;
use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{marker::GroupMarker, Id},
    types::validation::{is_valid_description, is_valid_slug},
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: Id<GroupMarker>,
    pub title: Option<String>,
    pub description: String,
    pub slug: String,
}

impl Group {
    #[tracing::instrument(skip(condition), name = "db.groups.by_slug")]
    pub async fn by_slug(conn: &mut Connection, condition: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "groups" WHERE slug = $1"#)
            .bind(condition)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    /// Every group, in slug order. The post form needs them to
    /// render its group choices.
    #[tracing::instrument(skip_all, name = "db.groups.all")]
    pub async fn all(conn: &mut Connection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "groups" ORDER BY slug"#)
            .fetch_all(conn)
            .await
            .into_db_error()
    }

    /// Removes a group. Posts filed under it stay around, the
    /// schema clears their group reference (`ON DELETE SET NULL`).
    #[tracing::instrument(skip_all, name = "db.groups.delete")]
    pub async fn delete(conn: &mut Connection, id: Id<GroupMarker>) -> Result<()> {
        sqlx::query(r#"DELETE FROM "groups" WHERE id = $1"#)
            .bind(id)
            .execute(conn)
            .await
            .into_db_error()?;
        Ok(())
    }
}

/// Administrative seam: groups are curated by the site operators,
/// there is no user-facing route creating them.
#[derive(Debug)]
pub struct InsertGroup<'a> {
    pub title: Option<&'a str>,
    pub description: &'a str,
    pub slug: &'a str,
}

impl InsertGroup<'_> {
    #[tracing::instrument(skip_all, name = "db.groups.insert")]
    pub async fn insert(&self, conn: &mut Connection) -> Result<Group> {
        debug_assert!(is_valid_slug(self.slug));
        debug_assert!(is_valid_description(self.description));

        sqlx::query_as::<_, Group>(
            r#"INSERT INTO "groups" (title, description, slug)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(self.title)
        .bind(self.description)
        .bind(self.slug)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
