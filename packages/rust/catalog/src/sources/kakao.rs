//! Kakao book search adapter.
//!
//! Requires a REST API key, sent as the `KakaoAK` authorization scheme.

use async_trait::async_trait;
use serde::Deserialize;

use bookmuse_shared::{CatalogItem, Result, SourceId};

use super::{CatalogSource, SearchRequest, get_json, parse_publish_year};

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct KakaoResponse {
    #[serde(default)]
    documents: Vec<KakaoDocument>,
}

#[derive(Debug, Deserialize)]
struct KakaoDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    publisher: Option<String>,
    /// ISO timestamp like `2014-11-17T00:00:00.000+09:00`.
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    /// Kakao calls the description snippet `contents`.
    #[serde(default)]
    contents: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Kakao book search (`/v3/search/book`).
pub struct KakaoBooksSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl KakaoBooksSource {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

fn normalize(doc: KakaoDocument) -> Option<CatalogItem> {
    if doc.title.trim().is_empty() {
        return None;
    }
    Some(CatalogItem::normalized(
        doc.title,
        doc.authors,
        doc.publisher,
        doc.datetime.as_deref().and_then(parse_publish_year),
        doc.thumbnail.filter(|t| !t.is_empty()),
        doc.contents,
        SourceId::Kakao,
    ))
}

#[async_trait]
impl CatalogSource for KakaoBooksSource {
    fn id(&self) -> SourceId {
        SourceId::Kakao
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>> {
        // The endpoint only serves Korean books; no language parameter.
        let builder = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&[
                ("query", request.keyword.as_str()),
                ("size", &request.max_results.to_string()),
            ]);

        let response: KakaoResponse = get_json(builder, "kakao book search").await?;
        Ok(response.documents.into_iter().filter_map(normalize).collect())
    }
}
