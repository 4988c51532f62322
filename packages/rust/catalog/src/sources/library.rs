//! Library catalog search adapter (정보나루-style JSON API).
//!
//! The service wraps each record in a `{"doc": {...}}` envelope and joins
//! multiple authors into one `;`-separated string.

use async_trait::async_trait;
use serde::Deserialize;

use bookmuse_shared::{CatalogItem, Result, SourceId};

use super::{CatalogSource, SearchRequest, get_json, parse_publish_year};

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LibraryResponse {
    response: LibraryBody,
}

#[derive(Debug, Deserialize)]
struct LibraryBody {
    #[serde(default)]
    docs: Vec<DocEnvelope>,
}

#[derive(Debug, Deserialize)]
struct DocEnvelope {
    doc: LibraryDoc,
}

#[derive(Debug, Deserialize)]
struct LibraryDoc {
    #[serde(default)]
    bookname: String,
    /// `;`-separated author string, e.g. `"지은이: 김초엽;김원영"`.
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    publication_year: Option<String>,
    #[serde(default, rename = "bookImageURL")]
    book_image_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Library catalog keyword search.
pub struct LibraryCatalogSource {
    client: reqwest::Client,
    endpoint: String,
    auth_key: String,
}

impl LibraryCatalogSource {
    pub fn new(client: reqwest::Client, endpoint: String, auth_key: String) -> Self {
        Self {
            client,
            endpoint,
            auth_key,
        }
    }
}

/// Split the joined author string, dropping role prefixes like `지은이:`.
fn split_authors(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|a| {
            let a = a.trim();
            match a.split_once(':') {
                Some((_, name)) => name.trim().to_string(),
                None => a.to_string(),
            }
        })
        .filter(|a| !a.is_empty())
        .collect()
}

fn normalize(doc: LibraryDoc) -> Option<CatalogItem> {
    if doc.bookname.trim().is_empty() {
        return None;
    }
    Some(CatalogItem::normalized(
        doc.bookname,
        doc.authors.as_deref().map(split_authors).unwrap_or_default(),
        doc.publisher,
        doc.publication_year.as_deref().and_then(parse_publish_year),
        doc.book_image_url.filter(|u| !u.is_empty()),
        doc.description,
        SourceId::Library,
    ))
}

#[async_trait]
impl CatalogSource for LibraryCatalogSource {
    fn id(&self) -> SourceId {
        SourceId::Library
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>> {
        let builder = self.client.get(&self.endpoint).query(&[
            ("authKey", self.auth_key.as_str()),
            ("keyword", request.keyword.as_str()),
            ("pageNo", "1"),
            ("pageSize", &request.max_results.to_string()),
            ("format", "json"),
        ]);

        let response: LibraryResponse = get_json(builder, "library catalog").await?;
        Ok(response
            .response
            .docs
            .into_iter()
            .filter_map(|d| normalize(d.doc))
            .collect())
    }
}
