use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Actor, Error},
    schema::{Group, InsertPost},
    types::form::{PostForm, PostFormErrors},
    App,
};

use super::form;

#[tracing::instrument]
pub async fn create_form(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
    actor.get_user(&app.config)?;

    let mut conn = app.db_read().await?;
    let groups = Group::all(&mut conn).await?;

    let blank = PostForm {
        text: String::new(),
        group: None,
    };
    render::page(
        "create_post.html",
        &form::context(&blank, &PostFormErrors::default(), &groups, false),
    )
}

#[tracing::instrument]
pub async fn create(
    app: web::Data<App>,
    actor: Actor,
    input: web::Form<PostForm>,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user(&app.config)?;

    let mut conn = app.db_write().await?;
    let mut errors = input.validate();
    let group_id = form::resolve_group(&mut conn, &input, &mut errors).await?;

    if !errors.is_empty() {
        let groups = Group::all(&mut conn).await?;
        return render::page(
            "create_post.html",
            &form::context(&input, &errors, &groups, false),
        );
    }

    InsertPost {
        author_id: user.id,
        text: input.text.trim(),
        group_id,
    }
    .insert(&mut conn)
    .await?;

    Ok(render::redirect(format!("/profile/{}/", user.name)))
}
