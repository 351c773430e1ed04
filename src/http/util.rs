use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{header, StatusCode},
    middleware::ErrorHandlerResponse,
};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

use super::render;

/// Same as [`DefaultRootSpanBuilder`] but request spans are emitted
/// at DEBUG so a production log level of INFO is not flooded with
/// one span per request.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        tracing_actix_web::root_span!(level = tracing::Level::DEBUG, request)
    }

    fn on_request_end<B: MessageBody>(
        span: Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Default error handler for responses that never went through one
/// of our handlers, like 404s for routes that do not exist. These
/// carry no body, so we give them the same error pages that
/// handler failures get.
pub fn handle_actix_web_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let template = match status {
        StatusCode::NOT_FOUND => "not_found.html",
        StatusCode::INTERNAL_SERVER_ERROR => "server_error.html",
        _ => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };

    let body = render::TEMPLATES
        .render(template, &tera::Context::new())
        .unwrap_or_else(|_| status.to_string());

    let (req, res) = res.into_parts();
    let mut res = res.set_body(body);
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/html; charset=utf-8"),
    );

    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();

    Ok(ErrorHandlerResponse::Response(res))
}
