pub mod openrouter;
pub mod util;

pub use openrouter::{ChatMessage, ChatRequest, ChatResponse, OpenRouter};
