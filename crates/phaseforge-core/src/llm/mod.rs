//! LLM integration - Groq OpenAI-compatible API
//!
//! This module provides:
//! - HTTP client for single-turn chat completions
//! - Request/response types matching the OpenAI-compatible API

mod client;
mod types;

pub use client::{LlmClient, LlmClientBuilder};
pub use types::{ChatRequest, ChatResponse, Choice, LlmResponse, Message, MessageRole, Usage};
