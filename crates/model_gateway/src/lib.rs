//! HTTP client for the vision-capable chat-completion endpoint.

pub mod client;

pub use client::OpenAiVisionClient;
