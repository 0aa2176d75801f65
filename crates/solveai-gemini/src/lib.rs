//! Gemini REST implementation of the SolveAI [`Solver`](solveai_core::solver::Solver).
//!
//! Every call is a single `generateContent` request; chats are stateless on
//! the wire and resend their full history each turn.

mod chat;
mod client;
mod prompts;
mod wire;

pub mod error;

pub use chat::GeminiChat;
pub use client::{
  DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiClient, GeminiConfig,
};
pub use error::{Error, Result};
