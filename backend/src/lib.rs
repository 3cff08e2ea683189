pub mod config;
pub mod error;
pub mod inference;
pub mod report;
pub mod routes;
pub mod state;
pub mod storage;
pub mod views;

pub use error::AppError;
pub use routes::{configure_routes, flash_framework};
pub use state::AppState;
