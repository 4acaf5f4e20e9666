//! OMI Universal Gateway.
//!
//! Accepts a prompt and a mode, rewrites the prompt through an intermediary
//! model, routes it to the backend the mode selects, strips instruction
//! artifacts from the reply and reports the request to an audit sink.

pub mod api;
pub mod audit;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod routing;

pub use error::{GatewayError, ProviderError, Result};
