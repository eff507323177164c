//! Model access for RFP analysis.
//!
//! This crate provides:
//! - [`Summarizer`]: the seam the analysis pipeline talks to
//! - [`OpenRouterClient`]: the production implementation over HTTP
//! - [`retry`]: exponential backoff for rate-limited calls

mod openrouter;
mod retry;

use std::future::Future;

use bidiq_shared::Result;

pub use openrouter::OpenRouterClient;
pub use retry::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy, retry};

/// A text-completion backend.
///
/// Implementations return [`BidIqError::RateLimited`](bidiq_shared::BidIqError::RateLimited)
/// when the upstream quota is exhausted so callers can back off or degrade.
pub trait Summarizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Send `prompt` with the `system` instruction and return the raw completion text.
    fn summarize(&self, system: &str, prompt: &str)
    -> impl Future<Output = Result<String>> + Send;
}
