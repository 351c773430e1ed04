use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Error},
    pagination::PageQuery,
    schema::{Post, PostFilter},
    App,
};

#[tracing::instrument]
pub async fn index(
    app: web::Data<App>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let mut conn = app.db_read().await?;
    let posts = Post::paginate(
        &mut conn,
        PostFilter::All,
        app.config.posts_per_page,
        query.requested(),
    )
    .await?;

    let mut context = tera::Context::new();
    context.insert("page_obj", &posts);
    render::page("index.html", &context)
}
