use actix_web::{body::BoxBody, http::header, http::StatusCode, HttpResponse};
use error_stack::Report;

use super::Error;
use crate::{database, http::render, types::Error as ErrorType};

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.as_type() {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            // both of these recover by sending the visitor
            // somewhere else, not by rendering an error page
            ErrorType::AuthRequired { .. } => StatusCode::FOUND,
            ErrorType::EditForbidden { .. } => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self.as_type() {
            ErrorType::Internal => {
                tracing::error!("unhandled error while serving a request:\n{self}");
                render::error_page(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ErrorType::NotFound => render::error_page(StatusCode::NOT_FOUND),
            ErrorType::AuthRequired { login_url } => HttpResponse::Found()
                .insert_header((header::LOCATION, login_url.as_str()))
                .finish(),
            ErrorType::EditForbidden { post_id } => HttpResponse::Found()
                .insert_header((header::LOCATION, format!("/posts/{post_id}/")))
                .finish(),
        }
    }
}

impl From<Report<database::Error>> for Error {
    fn from(value: Report<database::Error>) -> Self {
        Error::from_report(ErrorType::Internal, value)
    }
}
