//! Plain-text processing for RFP documents.
//!
//! This crate provides:
//! - [`chunk_text`]: boundary-aware splitting into size-bounded chunks
//! - [`basic_analysis`]: heuristic extraction used when no model is available

mod chunker;
mod patterns;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, chunk_text};
pub use patterns::{basic_analysis, extract_required_items};
