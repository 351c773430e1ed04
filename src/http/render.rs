use actix_web::{body::BoxBody, http::header, http::StatusCode, HttpResponse};
use once_cell::sync::Lazy;
use tera::Tera;

use super::Error;
use crate::types::Error as ErrorType;

/// All templates ship inside the binary, nothing is read from disk
/// at runtime.
pub(crate) static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    let loaded = tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("index.html", include_str!("../../templates/index.html")),
        (
            "group_list.html",
            include_str!("../../templates/group_list.html"),
        ),
        ("profile.html", include_str!("../../templates/profile.html")),
        (
            "post_detail.html",
            include_str!("../../templates/post_detail.html"),
        ),
        (
            "create_post.html",
            include_str!("../../templates/create_post.html"),
        ),
        (
            "includes/post_list.html",
            include_str!("../../templates/includes/post_list.html"),
        ),
        (
            "includes/pager.html",
            include_str!("../../templates/includes/pager.html"),
        ),
        (
            "not_found.html",
            include_str!("../../templates/not_found.html"),
        ),
        (
            "server_error.html",
            include_str!("../../templates/server_error.html"),
        ),
    ]);

    if let Err(error) = loaded {
        panic!("embedded templates must parse: {error}");
    }
    tera
});

/// Renders `template` with `context` into a 200 response. The
/// template engine is a rendering collaborator: handlers only ever
/// hand it a context mapping.
pub fn page(template: &str, context: &tera::Context) -> Result<HttpResponse, Error> {
    let body = TEMPLATES
        .render(template, context)
        .map_err(|e| Error::from_context(ErrorType::Internal, e))?;

    Ok(HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(body))
}

/// A plain 302 to `location`.
pub fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Error pages never fail: when even their template breaks we fall
/// back to the bare status line.
pub(crate) fn error_page(status: StatusCode) -> HttpResponse<BoxBody> {
    let template = match status {
        StatusCode::NOT_FOUND => "not_found.html",
        _ => "server_error.html",
    };

    let body = TEMPLATES
        .render(template, &tera::Context::new())
        .unwrap_or_else(|_| status.to_string());

    HttpResponse::build(status)
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(body)
}
