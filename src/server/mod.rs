mod books_routes;
pub mod config;
mod error;
mod http_layers;
mod search_routes;
pub mod server;
mod shelves_routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
