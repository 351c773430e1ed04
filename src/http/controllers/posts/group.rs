use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Error},
    pagination::PageQuery,
    schema::{Group, Post, PostFilter},
    App,
};

use super::not_found;

#[tracing::instrument]
pub async fn group(
    app: web::Data<App>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let mut conn = app.db_read().await?;
    let Some(group) = Group::by_slug(&mut conn, path.as_str()).await? else {
        return Err(not_found());
    };

    let posts = Post::paginate(
        &mut conn,
        PostFilter::Group(group.id),
        app.config.posts_per_page,
        query.requested(),
    )
    .await?;

    let mut context = tera::Context::new();
    context.insert("group", &group);
    context.insert("page_obj", &posts);
    render::page("group_list.html", &context)
}
