use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder};
use std::num::NonZeroU32;

use crate::{
    database::{Connection, ErrorExt, Result},
    pagination::{Paginated, Paginator},
    types::id::{
        marker::{GroupMarker, PostMarker, UserMarker},
        Id,
    },
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author_id: Id<UserMarker>,
    pub group_id: Option<Id<GroupMarker>>,
}

/// A post joined with the bits of its author and group that the
/// listing and detail pages show.
#[derive(Debug, Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct PostEntry {
    pub id: Id<PostMarker>,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author_id: Id<UserMarker>,
    pub author_name: String,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

/// Which slice of the post collection a listing page is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Id<GroupMarker>),
    Author(Id<UserMarker>),
}

impl PostFilter {
    fn push_where(self, query: &mut QueryBuilder<'_, sqlx::Postgres>) {
        match self {
            Self::All => {}
            Self::Group(id) => {
                query.push(" WHERE p.group_id = ");
                query.push_bind(id);
            }
            Self::Author(id) => {
                query.push(" WHERE p.author_id = ");
                query.push_bind(id);
            }
        }
    }
}

impl Post {
    #[tracing::instrument(skip_all, name = "db.posts.find")]
    pub async fn find(conn: &mut Connection, id: Id<PostMarker>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "posts" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    /// Whether `user` may mutate this post. Only the author can.
    #[must_use]
    pub fn editable_by(&self, user: &super::User) -> bool {
        self.author_id == user.id
    }

    #[tracing::instrument(skip_all, name = "db.posts.count")]
    pub async fn count(conn: &mut Connection, filter: PostFilter) -> Result<u64> {
        let mut query = QueryBuilder::new(r#"SELECT COUNT(*) FROM "posts" p"#);
        filter.push_where(&mut query);

        let (count,) = query
            .build_query_as::<(i64,)>()
            .fetch_one(conn)
            .await
            .into_db_error()?;

        Ok(count.unsigned_abs())
    }

    /// A bounded window of the filtered collection, newest first.
    #[tracing::instrument(skip_all, name = "db.posts.list")]
    pub async fn list(
        conn: &mut Connection,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostEntry>> {
        let mut query = QueryBuilder::new(
            r#"SELECT p.id, p.text, p.pub_date, p.author_id,
                      u.name AS author_name,
                      g.slug AS group_slug, g.title AS group_title
               FROM "posts" p
               INNER JOIN "users" u ON u.id = p.author_id
               LEFT JOIN "groups" g ON g.id = p.group_id"#,
        );
        filter.push_where(&mut query);

        query.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        query
            .build_query_as::<PostEntry>()
            .fetch_all(conn)
            .await
            .into_db_error()
    }

    /// Counts the filtered collection and fetches the requested
    /// page of it, with out-of-range page numbers clamped.
    #[tracing::instrument(skip_all, name = "db.posts.paginate")]
    pub async fn paginate(
        conn: &mut Connection,
        filter: PostFilter,
        per_page: NonZeroU32,
        requested_page: u64,
    ) -> Result<Paginated<PostEntry>> {
        let total = Self::count(conn, filter).await?;
        let page = Paginator::new(total, per_page).page(requested_page);
        let items = Self::list(conn, filter, page.limit(), page.offset()).await?;
        Ok(Paginated { items, page })
    }
}

impl PostEntry {
    #[tracing::instrument(skip_all, name = "db.posts.find_entry")]
    pub async fn find(conn: &mut Connection, id: Id<PostMarker>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"SELECT p.id, p.text, p.pub_date, p.author_id,
                      u.name AS author_name,
                      g.slug AS group_slug, g.title AS group_title
               FROM "posts" p
               INNER JOIN "users" u ON u.id = p.author_id
               LEFT JOIN "groups" g ON g.id = p.group_id
               WHERE p.id = $1"#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .into_db_error()
    }
}

#[derive(Debug)]
pub struct InsertPost<'a> {
    pub author_id: Id<UserMarker>,
    pub text: &'a str,
    pub group_id: Option<Id<GroupMarker>>,
}

impl InsertPost<'_> {
    /// `pub_date` is assigned by the database at insertion time and
    /// never changes afterwards.
    #[tracing::instrument(skip_all, name = "db.posts.insert")]
    pub async fn insert(&self, conn: &mut Connection) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"INSERT INTO "posts" (text, author_id, group_id)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(self.text)
        .bind(self.author_id)
        .bind(self.group_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}

#[derive(Debug)]
pub struct EditPost<'a> {
    pub id: Id<PostMarker>,
    pub text: &'a str,
    pub group_id: Option<Id<GroupMarker>>,
}

impl EditPost<'_> {
    /// Rewrites the post body and group choice, leaving the author
    /// and `pub_date` untouched.
    #[tracing::instrument(skip_all, name = "db.posts.update")]
    pub async fn update(&self, conn: &mut Connection) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"UPDATE "posts"
               SET text = $1, group_id = $2
               WHERE id = $3
               RETURNING *"#,
        )
        .bind(self.text)
        .bind(self.group_id)
        .bind(self.id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
