//! Catalog query engine: fan a keyword out to the enabled sources and
//! normalize the combined result set.
//!
//! A failing source contributes zero items for that keyword; only config
//! problems (unknown source, missing key) abort registry construction, and
//! those are caught before any external call.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use bookmuse_shared::{
    AppConfig, BookmuseError, CatalogItem, Credentials, DESCRIPTION_DISPLAY_CHARS, Result,
    SourceId, YearRangeConfig, truncate_chars,
};

use crate::sources::{
    CatalogSource, GoogleBooksSource, KakaoBooksSource, LibraryCatalogSource, SearchRequest,
};

/// User-Agent string for catalog requests.
const USER_AGENT: &str = concat!("bookmuse/", env!("CARGO_PKG_VERSION"));

/// Backoff before the single transport-error retry.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// QueryOptions
// ---------------------------------------------------------------------------

/// Per-run knobs for the query engine, merged from config.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Result-count bound per keyword per source.
    pub max_results: u32,
    /// Language restriction passed to sources that support one.
    pub language: String,
    /// Optional inclusive publish-year range.
    pub year_range: Option<YearRangeConfig>,
    /// Fill missing descriptions via a secondary title lookup.
    pub enrich_descriptions: bool,
    /// Bounded retries for transport errors.
    pub retry_transport: u32,
}

impl QueryOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_results: config.defaults.max_results,
            language: config.defaults.language.clone(),
            year_range: config.filters.year_range,
            enrich_descriptions: config.sources.enrich_descriptions,
            retry_transport: config.sources.retry_transport,
        }
    }
}

// ---------------------------------------------------------------------------
// SourceRegistry
// ---------------------------------------------------------------------------

/// Holds the enabled catalog sources in priority order.
pub struct SourceRegistry {
    sources: Vec<Box<dyn CatalogSource>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl SourceRegistry {
    /// Build the registry from config and resolved credentials.
    ///
    /// Fails with a config error when an enabled source is missing its key,
    /// so the run stops before any external call.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.defaults.timeout_secs))
            .build()
            .map_err(|e| BookmuseError::Network(format!("failed to build HTTP client: {e}")))?;

        let mut sources: Vec<Box<dyn CatalogSource>> = Vec::new();
        for source in &config.sources.enabled {
            let key = credentials.require_source(config, *source)?;
            match source {
                SourceId::GoogleBooks => sources.push(Box::new(GoogleBooksSource::new(
                    client.clone(),
                    config.sources.google_books_endpoint.clone(),
                ))),
                SourceId::Kakao => sources.push(Box::new(KakaoBooksSource::new(
                    client.clone(),
                    config.sources.kakao_endpoint.clone(),
                    key.unwrap_or_default().to_string(),
                ))),
                SourceId::Library => sources.push(Box::new(LibraryCatalogSource::new(
                    client.clone(),
                    config.sources.library_endpoint.clone(),
                    key.unwrap_or_default().to_string(),
                ))),
            }
        }

        Ok(Self { sources })
    }

    /// Build a registry from explicit sources (tests, custom wiring).
    pub fn with_sources(sources: Vec<Box<dyn CatalogSource>>) -> Self {
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Issue one search per enabled source and merge the results.
    ///
    /// Per-source failures degrade to zero items with a warning. The merged
    /// set is deduplicated across sources, year-filtered when configured,
    /// and description-enriched best-effort.
    #[instrument(skip_all, fields(keyword = %request.keyword))]
    pub async fn query(&self, request: &SearchRequest, opts: &QueryOptions) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = Vec::new();

        for source in &self.sources {
            match search_with_retry(source.as_ref(), request, opts.retry_transport).await {
                Ok(found) => {
                    debug!(source = %source.id(), count = found.len(), "source returned");
                    items.extend(found);
                }
                Err(e) => {
                    warn!(source = %source.id(), error = %e, "source failed, contributing zero items");
                }
            }
        }

        let merged = items.len();
        let mut items = dedup_items(items);

        if let Some(range) = opts.year_range {
            items.retain(|item| passes_year_filter(item.publish_year, &range));
        }

        if opts.enrich_descriptions {
            self.enrich_missing_descriptions(&mut items).await;
        }

        info!(
            merged,
            kept = items.len(),
            "keyword query complete"
        );
        items
    }

    /// Best-effort secondary lookup for items lacking a description.
    /// Failures leave the description empty.
    async fn enrich_missing_descriptions(&self, items: &mut [CatalogItem]) {
        for item in items.iter_mut().filter(|i| i.description.is_empty()) {
            let Some(secondary) = self.sources.iter().find(|s| s.id() != item.source) else {
                return;
            };
            match secondary.description_for_title(&item.title).await {
                Ok(Some(description)) => {
                    item.description =
                        truncate_chars(description.trim(), DESCRIPTION_DISPLAY_CHARS);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(title = %item.title, error = %e, "description lookup failed");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Retry transport errors up to `retries` times with a short backoff.
/// Status-level failures and malformed bodies are returned immediately.
async fn search_with_retry(
    source: &dyn CatalogSource,
    request: &SearchRequest,
    retries: u32,
) -> Result<Vec<CatalogItem>> {
    let mut attempt = 0;
    loop {
        match source.search(request).await {
            Ok(items) => return Ok(items),
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                debug!(source = %source.id(), attempt, error = %e, "transport error, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Inclusive year-range check. Undated items pass only when the range is
/// configured to include them (default: excluded).
fn passes_year_filter(year: Option<i32>, range: &YearRangeConfig) -> bool {
    match year {
        Some(y) => y >= range.min && y <= range.max,
        None => range.include_undated,
    }
}

/// Drop cross-source duplicates, keyed by normalized title + first author.
/// The first-seen (higher-priority source) record wins.
fn dedup_items(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(dedup_key(item)))
        .collect()
}

fn dedup_key(item: &CatalogItem) -> String {
    let normalize = |s: &str| s.split_whitespace().collect::<String>().to_lowercase();
    format!(
        "{}|{}",
        normalize(&item.title),
        item.authors.first().map(|a| normalize(a)).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(title: &str, author: &str, year: Option<i32>, source: SourceId) -> CatalogItem {
        CatalogItem::normalized(
            title.into(),
            vec![author.into()],
            None,
            year,
            None,
            None,
            source,
        )
    }

    fn options() -> QueryOptions {
        QueryOptions {
            max_results: 10,
            language: "ko".into(),
            year_range: None,
            enrich_descriptions: false,
            retry_transport: 1,
        }
    }

    fn request(keyword: &str) -> SearchRequest {
        SearchRequest {
            keyword: keyword.into(),
            max_results: 10,
            language: "ko".into(),
        }
    }

    fn kakao_body(titles: &[&str]) -> serde_json::Value {
        let documents: Vec<_> = titles
            .iter()
            .map(|t| {
                json!({
                    "title": t,
                    "authors": ["저자"],
                    "datetime": "2021-01-01T00:00:00.000+09:00"
                })
            })
            .collect();
        json!({ "documents": documents })
    }

    // -----------------------------------------------------------------------
    // Pure helpers
    // -----------------------------------------------------------------------

    #[test]
    fn year_filter_policy() {
        let range = YearRangeConfig {
            min: 2015,
            max: 2025,
            include_undated: false,
        };
        assert!(passes_year_filter(Some(2015), &range));
        assert!(passes_year_filter(Some(2025), &range));
        assert!(!passes_year_filter(Some(2014), &range));
        // Undated items are excluded by default.
        assert!(!passes_year_filter(None, &range));

        let inclusive = YearRangeConfig {
            include_undated: true,
            ..range
        };
        assert!(passes_year_filter(None, &inclusive));
    }

    #[test]
    fn dedup_keeps_first_seen_source() {
        let items = vec![
            item("코스모스", "칼 세이건", Some(2006), SourceId::Kakao),
            item("코스모스 ", "칼  세이건", Some(2006), SourceId::GoogleBooks),
            item("코스모스", "다른 저자", None, SourceId::GoogleBooks),
        ];
        let deduped = dedup_items(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].source, SourceId::Kakao);
    }

    // -----------------------------------------------------------------------
    // Registry behavior
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failing_source_degrades_to_other_sources() {
        let ok_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(kakao_body(&["살아남은 책"])))
            .mount(&ok_server)
            .await;

        let failing_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&failing_server)
            .await;

        let client = reqwest::Client::new();
        let registry = SourceRegistry::with_sources(vec![
            Box::new(GoogleBooksSource::new(client.clone(), failing_server.uri())),
            Box::new(KakaoBooksSource::new(client, ok_server.uri(), "k".into())),
        ]);

        let items = registry.query(&request("키워드"), &options()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "살아남은 책");
    }

    #[tokio::test]
    async fn status_failures_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let registry = SourceRegistry::with_sources(vec![Box::new(GoogleBooksSource::new(
            reqwest::Client::new(),
            server.uri(),
        ))]);

        let opts = QueryOptions {
            retry_transport: 3,
            ..options()
        };
        let items = registry.query(&request("키워드"), &opts).await;
        assert!(items.is_empty());
        // MockServer verifies expect(1) on drop.
    }

    #[tokio::test]
    async fn year_range_applies_after_merge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "title": "옛날 책", "authors": ["a"], "datetime": "1995-01-01" },
                    { "title": "요즘 책", "authors": ["b"], "datetime": "2022-01-01" },
                    { "title": "연도 미상", "authors": ["c"], "datetime": "" }
                ]
            })))
            .mount(&server)
            .await;

        let registry = SourceRegistry::with_sources(vec![Box::new(KakaoBooksSource::new(
            reqwest::Client::new(),
            server.uri(),
            "k".into(),
        ))]);

        let opts = QueryOptions {
            year_range: Some(YearRangeConfig {
                min: 2015,
                max: 2030,
                include_undated: false,
            }),
            ..options()
        };
        let items = registry.query(&request("책"), &opts).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "요즘 책");
    }

    #[tokio::test]
    async fn missing_description_is_enriched_from_secondary_source() {
        let kakao_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "title": "코스모스", "authors": ["칼 세이건"], "datetime": "2006-12-20" }
                ]
            })))
            .mount(&kakao_server)
            .await;

        let google_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "intitle:\"코스모스\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "volumeInfo": { "title": "코스모스", "description": "우주에 대한 고전." } }
                ]
            })))
            .mount(&google_server)
            .await;

        let client = reqwest::Client::new();
        let registry = SourceRegistry::with_sources(vec![
            Box::new(KakaoBooksSource::new(
                client.clone(),
                kakao_server.uri(),
                "k".into(),
            )),
            Box::new(GoogleBooksSource::new(client, google_server.uri())),
        ]);

        let opts = QueryOptions {
            enrich_descriptions: true,
            ..options()
        };
        let items = registry.query(&request("코스모스"), &opts).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "우주에 대한 고전.");
    }

    #[tokio::test]
    async fn failed_enrichment_leaves_description_empty() {
        let kakao_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(kakao_body(&["어떤 책"])))
            .mount(&kakao_server)
            .await;

        let failing = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&failing)
            .await;

        let client = reqwest::Client::new();
        let registry = SourceRegistry::with_sources(vec![
            Box::new(KakaoBooksSource::new(
                client.clone(),
                kakao_server.uri(),
                "k".into(),
            )),
            Box::new(GoogleBooksSource::new(client, failing.uri())),
        ]);

        let opts = QueryOptions {
            enrich_descriptions: true,
            ..options()
        };
        let items = registry.query(&request("어떤 책"), &opts).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "");
    }

    #[tokio::test]
    async fn registry_from_config_requires_kakao_key() {
        let config = AppConfig::default();
        let creds = Credentials::default();
        let err = SourceRegistry::from_config(&config, &creds).unwrap_err();
        assert!(matches!(err, BookmuseError::Config { .. }));

        let creds = Credentials {
            kakao_key: Some("k".into()),
            ..Credentials::default()
        };
        let registry = SourceRegistry::from_config(&config, &creds).unwrap();
        assert!(!registry.is_empty());
    }
}
