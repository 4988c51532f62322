//! Google Books volumes adapter.
//!
//! Keyword search is keyless. This source also backs the best-effort
//! description enrichment via an `intitle:` lookup.

use async_trait::async_trait;
use serde::Deserialize;

use bookmuse_shared::{CatalogItem, Result, SourceId};

use super::{CatalogSource, SearchRequest, get_json, parse_publish_year};

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Google Books volumes search.
pub struct GoogleBooksSource {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleBooksSource {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    async fn volumes(&self, query: &str, max_results: u32, language: &str) -> Result<Vec<Volume>> {
        let builder = self.client.get(&self.endpoint).query(&[
            ("q", query),
            ("maxResults", &max_results.to_string()),
            ("langRestrict", language),
            ("printType", "books"),
        ]);

        let response: VolumesResponse = get_json(builder, "google books").await?;
        Ok(response.items)
    }
}

fn normalize(info: VolumeInfo) -> Option<CatalogItem> {
    // Title is the one required field; items without one are unusable.
    let title = info.title.filter(|t| !t.trim().is_empty())?;
    Some(CatalogItem::normalized(
        title,
        info.authors,
        info.publisher,
        info.published_date.as_deref().and_then(parse_publish_year),
        info.image_links.and_then(|l| l.thumbnail),
        info.description,
        SourceId::GoogleBooks,
    ))
}

#[async_trait]
impl CatalogSource for GoogleBooksSource {
    fn id(&self) -> SourceId {
        SourceId::GoogleBooks
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>> {
        let volumes = self
            .volumes(&request.keyword, request.max_results, &request.language)
            .await?;
        Ok(volumes
            .into_iter()
            .filter_map(|v| normalize(v.volume_info))
            .collect())
    }

    async fn description_for_title(&self, title: &str) -> Result<Option<String>> {
        let query = format!("intitle:\"{title}\"");
        let volumes = self.volumes(&query, 1, "ko").await?;
        Ok(volumes
            .into_iter()
            .next()
            .and_then(|v| v.volume_info.description)
            .filter(|d| !d.trim().is_empty()))
    }
}
