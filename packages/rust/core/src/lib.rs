//! RFP analysis pipeline for BidIQ.
//!
//! Ties the model client, pattern extraction, and normalization together
//! into [`Analyzer::analyze`], and derives clarification questions from the
//! result.

pub mod analysis;
pub mod normalize;
pub mod questions;

pub use analysis::{
    AnalysisOptions, AnalysisProgress, Analyzer, DEFAULT_MAX_DOCUMENT_CHARS, RATE_LIMIT_NOTE,
    SilentProgress,
};
pub use normalize::normalize_required_items;
pub use questions::generate_clarification_questions;
