//! Catalog query layer: keyword in, normalized book records out.
//!
//! This crate provides:
//! - [`sources`] — per-service adapters (Google Books, Kakao, library catalog)
//! - [`SourceRegistry`] — fans one keyword out to the enabled sources
//! - [`engine`] — merge, dedup, year filter, description enrichment

pub mod engine;
pub mod sources;

pub use engine::{QueryOptions, SourceRegistry};
pub use sources::{
    CatalogSource, GoogleBooksSource, KakaoBooksSource, LibraryCatalogSource, SearchRequest,
    parse_publish_year,
};
