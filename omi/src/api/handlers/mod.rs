pub(crate) mod generate;
pub(crate) mod health;

pub use generate::generate;
pub use health::health_check;

use crate::error::GatewayError;

pub async fn not_found() -> GatewayError {
    GatewayError::NotFound
}

pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}
