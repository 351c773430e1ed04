use actix_web::{web, HttpResponse};

use crate::{
    http::{render, Actor, Error},
    schema::{EditPost, Group, Post},
    types::form::{PostForm, PostFormErrors},
    types::id::{marker::PostMarker, Id},
    App,
};

use super::{form, not_found};

#[tracing::instrument]
pub async fn edit_form(
    app: web::Data<App>,
    actor: Actor,
    path: web::Path<Id<PostMarker>>,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user(&app.config)?;

    let mut conn = app.db_read_prefer_primary().await?;
    let Some(post) = Post::find(&mut conn, *path).await? else {
        return Err(not_found());
    };

    if !post.editable_by(&user) {
        return Err(Error::new(crate::types::Error::EditForbidden {
            post_id: post.id,
        }));
    }

    let groups = Group::all(&mut conn).await?;
    let group_slug = post
        .group_id
        .and_then(|id| groups.iter().find(|g| g.id == id))
        .map(|g| g.slug.clone());

    let prefilled = PostForm {
        text: post.text.clone(),
        group: group_slug,
    };
    render::page(
        "create_post.html",
        &form::context(&prefilled, &PostFormErrors::default(), &groups, true),
    )
}

#[tracing::instrument]
pub async fn edit(
    app: web::Data<App>,
    actor: Actor,
    path: web::Path<Id<PostMarker>>,
    input: web::Form<PostForm>,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user(&app.config)?;

    let mut conn = app.db_write().await?;
    let Some(post) = Post::find(&mut conn, *path).await? else {
        return Err(not_found());
    };

    if !post.editable_by(&user) {
        return Err(Error::new(crate::types::Error::EditForbidden {
            post_id: post.id,
        }));
    }

    let mut errors = input.validate();
    let group_id = form::resolve_group(&mut conn, &input, &mut errors).await?;

    if !errors.is_empty() {
        let groups = Group::all(&mut conn).await?;
        return render::page(
            "create_post.html",
            &form::context(&input, &errors, &groups, true),
        );
    }

    EditPost {
        id: post.id,
        text: input.text.trim(),
        group_id,
    }
    .update(&mut conn)
    .await?;

    Ok(render::redirect(format!("/posts/{}/", post.id)))
}
