pub mod post;

pub use post::{PostForm, PostFormErrors};
