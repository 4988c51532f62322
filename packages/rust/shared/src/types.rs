//! Core domain types for the bookmuse recommendation pipeline.
//!
//! All records here live for exactly one run: they are created by the
//! pipeline, handed to the presenter, and discarded. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder author label for catalog records with no author field.
pub const UNKNOWN_AUTHOR: &str = "작자 미상";

/// Maximum length (in characters, not bytes) of a description snippet
/// as shown to the user. Catalog descriptions are truncated to this.
pub const DESCRIPTION_DISPLAY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// SourceId
// ---------------------------------------------------------------------------

/// Which catalog service produced a record. Used for dedup and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    GoogleBooks,
    Kakao,
    Library,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleBooks => "google-books",
            Self::Kakao => "kakao",
            Self::Library => "library",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

/// Whether a keyword anchors the recommendation or diversifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordRole {
    Primary,
    Variant,
}

/// A short natural-language search string (2-4 words).
///
/// Keywords within one derivation result are pairwise distinct after
/// trimming; the deriver enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub role: KeywordRole,
}

impl Keyword {
    pub fn primary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: KeywordRole::Primary,
        }
    }

    pub fn variant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: KeywordRole::Variant,
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// Normalized book record, common to all catalog sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Book title. The only field every source is required to supply.
    pub title: String,
    /// Ordered author list; [`UNKNOWN_AUTHOR`] when the source has none.
    pub authors: Vec<String>,
    /// Publisher name, possibly empty.
    #[serde(default)]
    pub publisher: String,
    /// Publish year parsed from the source's date-ish field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    /// Cover thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Description/contents snippet, truncated for display. Possibly empty.
    #[serde(default)]
    pub description: String,
    /// Which catalog API produced this record.
    pub source: SourceId,
}

impl CatalogItem {
    /// Normalize raw source fields into a presentable record.
    ///
    /// Empty author lists map to the unknown-author placeholder and the
    /// description is truncated at a char boundary to the display length.
    pub fn normalized(
        title: String,
        authors: Vec<String>,
        publisher: Option<String>,
        publish_year: Option<i32>,
        thumbnail_url: Option<String>,
        description: Option<String>,
        source: SourceId,
    ) -> Self {
        let authors: Vec<String> = authors
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        let authors = if authors.is_empty() {
            vec![UNKNOWN_AUTHOR.to_string()]
        } else {
            authors
        };

        Self {
            title,
            authors,
            publisher: publisher.unwrap_or_default(),
            publish_year,
            thumbnail_url,
            description: truncate_chars(
                description.unwrap_or_default().trim(),
                DESCRIPTION_DISPLAY_CHARS,
            ),
            source,
        }
    }
}

/// Truncate a string to at most `max_chars` characters, never splitting a
/// multi-byte character. Korean text makes byte slicing unsafe here.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// RecommendationResult
// ---------------------------------------------------------------------------

/// One recommended item with its optional generated justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item: CatalogItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

/// Items grouped under the keyword that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub keyword: Keyword,
    pub items: Vec<RecommendedItem>,
}

/// Presentation-ready output of one pipeline run.
///
/// Created fresh per run and discarded after render; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Identifier of the run that produced this result, for log correlation.
    pub run_id: RunId,
    /// When the run completed.
    pub generated_at: DateTime<Utc>,
    /// One-line profile summary (generative strategy only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_summary: Option<String>,
    /// Result groups in keyword order.
    pub groups: Vec<KeywordGroup>,
    /// Set to the fallback keyword when a broadened search was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadened_with: Option<String>,
}

impl RecommendationResult {
    /// True when no item survived filtering in any group.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.items.is_empty())
    }

    /// Total surviving items across all groups.
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }
}
