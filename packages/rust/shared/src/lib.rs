//! Shared types, error model, and configuration for bookmuse.
//!
//! This crate is the foundation depended on by all other bookmuse crates.
//! It provides:
//! - [`BookmuseError`] — the unified error type
//! - Domain types ([`CatalogItem`], [`Keyword`], [`RecommendationResult`], [`RunId`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, DefaultsConfig, FiltersConfig, SourcesConfig, StrategyConfig,
    StrategyMode, TextgenConfig, YearRangeConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{BookmuseError, Result};
pub use types::{
    CatalogItem, DESCRIPTION_DISPLAY_CHARS, Keyword, KeywordGroup, KeywordRole,
    RecommendationResult, RecommendedItem, RunId, SourceId, UNKNOWN_AUTHOR, truncate_chars,
};
