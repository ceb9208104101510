//! LLM-gateway translation and language service (C2).
//!
//! Pairs a tiered-fallback chat-completion client against an OpenRouter-style
//! gateway with the pure keyword-frequency detector in `research-core`, so a
//! translation is never stored as a silent passthrough of its own source
//! text.

pub mod config;
pub mod error;
pub mod translator;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use translator::LlmTranslationService;
