//! Finbot LLM - Multi-Provider AI Orchestration
//!
//! This crate lets callers request a natural-language completion
//! without knowing which backend answers it:
//!
//! ## Providers
//! - DeepSeek (default priority)
//! - OpenAI (GPT)
//! - Anthropic (Claude)
//!
//! ## Key Design Principles
//!
//! 1. One stable capability interface per backend: `is_available`,
//!    `simple_chat`, `chat`, `raw_completion`
//! 2. Failover chain: providers are tried in priority order, one at a
//!    time, first success wins
//! 3. Bounded tool calling: a backend may request exactly one local
//!    tool invocation before its final answer
//! 4. JSON mode for structured outputs; callers parse the content
//!    themselves
//!
//! A missing credential makes a provider unavailable rather than an
//! error; the chain simply moves on.

pub mod config;
pub mod factory;
pub mod manager;
pub mod providers;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use factory::*;
pub use manager::*;
pub use providers::*;
pub use tools::*;
pub use types::*;
