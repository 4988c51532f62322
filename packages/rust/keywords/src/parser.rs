//! Completion-output parser for the generative keyword strategy.
//!
//! Two documented shapes are accepted:
//! - shape A: a single comma-separated line of keywords
//!   (`"키워드1, 키워드2, 키워드3"`)
//! - shape B: a labeled block
//!   (`독서성향:` summary line, `대표추천:` primary keyword line,
//!   `보조추천:` optional comma-separated variants line)
//!
//! Anything that parses to fewer keywords/lines than required is a
//! malformed response: the caller fails the run rather than guessing.

use bookmuse_shared::{BookmuseError, Keyword, Result};

use crate::DerivedKeywords;

/// Line label for the profile-summary line (shape B).
pub const SUMMARY_LABEL: &str = "독서성향:";

/// Line label for the primary-keyword line (shape B).
pub const PRIMARY_LABEL: &str = "대표추천:";

/// Line label for the variants line (shape B).
pub const VARIANT_LABEL: &str = "보조추천:";

// ---------------------------------------------------------------------------
// ParseSpec
// ---------------------------------------------------------------------------

/// How strictly to parse a completion.
#[derive(Debug, Clone, Copy)]
pub struct ParseSpec {
    /// Minimum keyword count (shape A) below which the output is malformed.
    pub min_keywords: usize,
    /// Keywords beyond this count are dropped, preserving order.
    pub max_keywords: usize,
    /// Shape B only: whether the variants line is required.
    pub require_variants: bool,
}

impl Default for ParseSpec {
    fn default() -> Self {
        Self {
            min_keywords: 1,
            max_keywords: 3,
            require_variants: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a completion into deduplicated, trimmed keywords.
///
/// The labeled block wins when any line carries a known label; otherwise the
/// first non-empty line is treated as shape A.
pub fn parse_completion(text: &str, spec: &ParseSpec) -> Result<DerivedKeywords> {
    let is_labeled = text.lines().any(|line| {
        let t = line.trim();
        t.starts_with(SUMMARY_LABEL) || t.starts_with(PRIMARY_LABEL) || t.starts_with(VARIANT_LABEL)
    });

    if is_labeled {
        parse_labeled_block(text, spec)
    } else {
        parse_comma_line(text, spec)
    }
}

// ---------------------------------------------------------------------------
// Shape A: comma-separated line
// ---------------------------------------------------------------------------

fn parse_comma_line(text: &str, spec: &ParseSpec) -> Result<DerivedKeywords> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| BookmuseError::malformed("completion is empty"))?;

    let tokens = split_tokens(line);
    if tokens.len() < spec.min_keywords {
        return Err(BookmuseError::malformed(format!(
            "expected at least {} keyword(s), got {}",
            spec.min_keywords,
            tokens.len()
        )));
    }

    let keywords = tokens
        .into_iter()
        .take(spec.max_keywords)
        .enumerate()
        .map(|(i, text)| {
            if i == 0 {
                Keyword::primary(text)
            } else {
                Keyword::variant(text)
            }
        })
        .collect();

    Ok(DerivedKeywords {
        summary: None,
        keywords,
    })
}

// ---------------------------------------------------------------------------
// Shape B: labeled block
// ---------------------------------------------------------------------------

fn parse_labeled_block(text: &str, spec: &ParseSpec) -> Result<DerivedKeywords> {
    let mut summary: Option<String> = None;
    let mut primary: Option<String> = None;
    let mut variants: Option<Vec<String>> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(SUMMARY_LABEL) {
            summary = Some(rest.trim().to_string()).filter(|s| !s.is_empty());
        } else if let Some(rest) = line.strip_prefix(PRIMARY_LABEL) {
            primary = Some(rest.trim().to_string()).filter(|s| !s.is_empty());
        } else if let Some(rest) = line.strip_prefix(VARIANT_LABEL) {
            variants = Some(split_tokens(rest));
        }
        // Other lines (model chatter) are ignored without erroring.
    }

    let summary = summary.ok_or_else(|| {
        BookmuseError::malformed(format!("missing required line `{SUMMARY_LABEL}`"))
    })?;
    let primary = primary.ok_or_else(|| {
        BookmuseError::malformed(format!("missing required line `{PRIMARY_LABEL}`"))
    })?;

    if spec.require_variants && variants.as_ref().is_none_or(Vec::is_empty) {
        return Err(BookmuseError::malformed(format!(
            "missing required line `{VARIANT_LABEL}`"
        )));
    }

    let mut keywords = vec![Keyword::primary(primary)];
    for variant in variants.unwrap_or_default() {
        if keywords.len() >= spec.max_keywords {
            break;
        }
        if keywords.iter().any(|k| k.text == variant) {
            continue;
        }
        keywords.push(Keyword::variant(variant));
    }

    Ok(DerivedKeywords {
        summary: Some(summary),
        keywords,
    })
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

/// Split a comma-separated token line: trim, drop empties, dedupe
/// preserving first occurrence.
fn split_tokens(line: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for token in line.split(',') {
        let token = token.trim();
        if token.is_empty() || seen.iter().any(|s| s == token) {
            continue;
        }
        seen.push(token.to_string());
    }
    seen
}
