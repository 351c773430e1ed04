use crate::http::Error;

mod form;

mod create;
mod detail;
mod edit;
mod group;
mod index;
mod profile;

pub use create::{create, create_form};
pub use detail::detail;
pub use edit::{edit, edit_form};
pub use group::group;
pub use index::index;
pub use profile::profile;

fn not_found() -> Error {
    #[derive(Debug, thiserror::Error)]
    #[error("Resource was not found")]
    struct ResourceError;

    Error::from_context(crate::types::Error::NotFound, ResourceError)
}
