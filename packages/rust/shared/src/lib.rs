//! Shared types, error model, and configuration for BidIQ.
//!
//! This crate is the foundation depended on by all other BidIQ crates.
//! It provides:
//! - [`BidIqError`]: the unified error type
//! - Domain types ([`AnalysisResult`], [`RequiredItem`], [`ClarificationQuestion`])
//! - Configuration ([`AppConfig`], [`AnalysisConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AppConfig, OpenRouterConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key, validate_config,
};
pub use error::{BidIqError, Result};
pub use types::{
    AnalysisResult, ClarificationQuestion, DEFAULT_FORMAT, DEFAULT_PAGE, DEFAULT_REQUIREMENTS,
    ItemType, RequiredItem, Section,
};
