mod anthropic;
mod backend;
mod factory;
mod gemini;
mod openai;
pub mod prompts;

pub use anthropic::AnthropicBackend;
pub use backend::PromptBackend;
pub use factory::{BackendFactory, HttpBackendFactory};
pub use gemini::GeminiBackend;
pub use openai::OpenAiCompatBackend;

#[cfg(test)]
pub(crate) mod testing;
