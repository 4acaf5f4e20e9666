//! The per-request gateway flow.
//!
//! [`GatewayPipeline`] is the only entry point the HTTP layer uses; the
//! individual steps are public for reuse and testing.

mod dispatcher;
mod orchestrator;
pub mod rewriter;
mod sanitizer;

pub use dispatcher::Dispatcher;
pub use orchestrator::{GatewayOutcome, GatewayPipeline, GatewayRequest, Stage};
pub use sanitizer::{Sanitizer, LEAK_MARKERS};
