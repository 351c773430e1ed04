use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Error},
    schema::{Post, PostEntry, PostFilter},
    types::id::{marker::PostMarker, Id},
    App,
};

use super::not_found;

#[tracing::instrument]
pub async fn detail(
    app: web::Data<App>,
    path: web::Path<Id<PostMarker>>,
) -> Result<HttpResponse, Error> {
    let mut conn = app.db_read().await?;
    let Some(post) = PostEntry::find(&mut conn, *path).await? else {
        return Err(not_found());
    };

    let posts_count = Post::count(&mut conn, PostFilter::Author(post.author_id)).await?;

    let mut context = tera::Context::new();
    context.insert("post", &post);
    context.insert("posts_count", &posts_count);
    render::page("post_detail.html", &context)
}
