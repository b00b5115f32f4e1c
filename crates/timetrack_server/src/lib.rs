//! HTTP surface for the time tracker: configuration, routing and the
//! external people-info lookup.

pub mod config;
pub mod error;
pub mod people_api;
pub mod request_log;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use people_api::{LookupError, PeopleInfoClient};
pub use routes::build_router;
pub use state::AppState;
