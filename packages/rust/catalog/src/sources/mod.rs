//! Catalog source trait and built-in service adapters.
//!
//! Each adapter normalizes one service's response shape into
//! [`CatalogItem`]. Adapters are held by the registry in priority order;
//! a failing adapter contributes zero items for that keyword.

mod google;
mod kakao;
mod library;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use bookmuse_shared::{BookmuseError, CatalogItem, Result, SourceId};

pub use google::GoogleBooksSource;
pub use kakao::KakaoBooksSource;
pub use library::LibraryCatalogSource;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One keyword search against a catalog service.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Derived search keyword.
    pub keyword: String,
    /// Result-count bound per source.
    pub max_results: u32,
    /// Language/locale restriction, where the service supports one.
    pub language: String,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One external book-catalog service.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source identifier for tracing and dedup.
    fn id(&self) -> SourceId;

    /// Search by keyword, normalizing the response into [`CatalogItem`]s.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>>;

    /// Best-effort description lookup by exact title, for enriching items
    /// from sources that return none. `Ok(None)` when unsupported or when
    /// nothing matches.
    async fn description_for_title(&self, _title: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Send a GET request and decode the JSON body.
///
/// Transport failures are [`BookmuseError::Network`] (retryable), non-success
/// statuses are [`BookmuseError::Status`], and an undecodable body is
/// [`BookmuseError::MalformedResponse`] (neither is retried).
pub(crate) async fn get_json<T: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    label: &str,
) -> Result<T> {
    let response = builder
        .send()
        .await
        .map_err(|e| BookmuseError::Network(format!("{label}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BookmuseError::Status {
            status: status.as_u16(),
            message: label.to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| BookmuseError::malformed(format!("{label}: {e}")))
}

/// Parse a publish year as the first run of four digits in a date-ish field
/// (`"2014-11-17"`, `"2014. 11."`, `"2014"` all yield 2014).
pub fn parse_publish_year(raw: &str) -> Option<i32> {
    let mut start = None;
    let mut count = 0;
    for (i, c) in raw.char_indices() {
        if c.is_ascii_digit() {
            if count == 0 {
                start = Some(i);
            }
            count += 1;
            if count == 4 {
                return raw[start?..=i].parse().ok();
            }
        } else {
            count = 0;
            start = None;
        }
    }
    None
}
