pub mod app;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod state;
pub mod store;

pub use app::router;
pub use state::AppState;
pub use store::{load_catalog, resolve_data_path, JsonStore};
