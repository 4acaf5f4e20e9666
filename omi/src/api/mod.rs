pub mod dto;
mod extractors;
mod handlers;
pub mod openapi;
mod routes;
mod state;

pub use extractors::{AppJson, GatewayHeaders, API_KEY_HEADER};
pub use routes::create_router;
pub use state::AppState;
