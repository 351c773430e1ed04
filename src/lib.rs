pub mod app;
pub mod config;
pub mod database;
pub mod http;
pub mod pagination;
pub mod schema;
pub mod types;
pub mod util;

pub use app::App;

pub(crate) mod internal;
