use thiserror::Error;

use crate::types::id::{marker::PostMarker, Id};

/// Every way a request can fail that the handlers care about.
///
/// Validation problems are not part of this taxonomy: an invalid
/// post form re-renders the form with field messages and a 200,
/// it never becomes an error response.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal server error")]
    Internal,
    #[error("Resource was not found")]
    NotFound,
    /// The visitor must go through the login flow first. Where that
    /// flow lives is configuration, the session subsystem is not
    /// part of this application.
    #[error("Authentication required")]
    AuthRequired { login_url: String },
    /// Somebody who is not the author tried to edit a post. They are
    /// quietly sent back to the post's detail page instead of being
    /// shown an error.
    #[error("Only the author can edit a post")]
    EditForbidden { post_id: Id<PostMarker> },
}
