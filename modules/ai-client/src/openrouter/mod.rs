mod client;
mod types;

pub use client::OpenRouter;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ResponseMessage};
