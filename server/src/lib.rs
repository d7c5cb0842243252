pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig, StoreKind};
pub use error::ApiError;
pub use identity::{Caller, USER_ID_HEADER};
pub use routes::create_router;
pub use state::AppState;
