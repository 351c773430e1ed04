mod group;
mod post;
mod user;

pub use group::{Group, InsertGroup};
pub use post::{EditPost, InsertPost, Post, PostEntry, PostFilter};
pub use user::{User, ANONYMOUS};
