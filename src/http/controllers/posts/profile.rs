use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Error},
    pagination::PageQuery,
    schema::{Post, PostFilter, User},
    App,
};

use super::not_found;

#[tracing::instrument]
pub async fn profile(
    app: web::Data<App>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let mut conn = app.db_read().await?;
    let Some(author) = User::by_name(&mut conn, path.as_str()).await? else {
        return Err(not_found());
    };

    let posts = Post::paginate(
        &mut conn,
        PostFilter::Author(author.id),
        app.config.posts_per_page,
        query.requested(),
    )
    .await?;

    let mut context = tera::Context::new();
    context.insert("author", &author);
    context.insert("posts_count", &posts.page.total);
    context.insert("page_obj", &posts);
    render::page("profile.html", &context)
}
