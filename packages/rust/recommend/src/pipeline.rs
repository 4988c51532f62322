//! End-to-end recommendation pipeline:
//! profile → keywords → catalog query → filters → justification → result.
//!
//! One run executes the stages sequentially and owns every record it
//! creates; nothing survives past the returned [`RecommendationResult`].
//! Only the collecting stage (missing credentials) and the deriving stage
//! (malformed generation output) fail the run; querying, filtering, and
//! justification degrade per source or per item.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use bookmuse_catalog::{QueryOptions, SearchRequest, SourceRegistry};
use bookmuse_keywords::{DerivedKeywords, ParseSpec};
use bookmuse_profile::UserProfile;
use bookmuse_shared::{
    AppConfig, Credentials, Keyword, KeywordGroup, RecommendationResult, RecommendedItem, Result,
    RunId, StrategyMode,
};
use bookmuse_textgen::TextgenClient;

use crate::{filters, justify};

// ---------------------------------------------------------------------------
// Run stages
// ---------------------------------------------------------------------------

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Collecting,
    Deriving,
    Querying,
    Filtering,
    Presenting,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Deriving => "deriving",
            Self::Querying => "querying",
            Self::Filtering => "filtering",
            Self::Presenting => "presenting",
        }
    }
}

// ---------------------------------------------------------------------------
// Options & progress
// ---------------------------------------------------------------------------

/// Per-run options, merged from CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Annotate surviving items with generated justifications.
    pub justify: bool,
    /// Cap on displayed items per keyword group.
    pub limit: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            justify: true,
            limit: None,
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn stage(&self, stage: RunStage);
    /// Called after each keyword query with the surviving count.
    fn keyword_queried(&self, keyword: &str, found: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: RunStage) {}
    fn keyword_queried(&self, _keyword: &str, _found: usize) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full recommendation pipeline for one profile.
#[instrument(skip_all)]
pub async fn recommend(
    config: &AppConfig,
    credentials: &Credentials,
    profile: &UserProfile,
    opts: &RunOptions,
    progress: &dyn ProgressReporter,
) -> Result<RecommendationResult> {
    let run_id = RunId::new();
    let start = Instant::now();
    info!(%run_id, strategy = ?config.strategy.mode, "starting recommendation run");

    // --- Collecting: validate profile and credentials before any call ---
    progress.stage(RunStage::Collecting);
    profile.validate()?;

    let needs_textgen = config.strategy.mode == StrategyMode::Generative
        || (opts.justify && config.defaults.justify_top_n > 0);
    let textgen = if needs_textgen {
        let key = credentials.require_textgen(config)?;
        Some(TextgenClient::new(
            &config.textgen,
            key.to_string(),
            config.defaults.timeout_secs,
        )?)
    } else {
        None
    };

    let registry = SourceRegistry::from_config(config, credentials)?;

    // --- Deriving ---
    progress.stage(RunStage::Deriving);
    let spec = ParseSpec::default();
    let derived =
        bookmuse_keywords::derive(config.strategy.mode, textgen.as_ref(), profile, &spec).await?;

    if derived.is_empty() {
        // An empty deterministic keyword means "no query", not a failure.
        info!(%run_id, "no keyword derived, presenting empty result");
        progress.stage(RunStage::Presenting);
        return Ok(assemble(run_id, derived, vec![], None));
    }

    // --- Querying ---
    progress.stage(RunStage::Querying);
    let query_opts = QueryOptions::from_config(config);
    let mut groups: Vec<(Keyword, Vec<bookmuse_shared::CatalogItem>)> = Vec::new();

    for keyword in &derived.keywords {
        let request = search_request(&keyword.text, config);
        let items = registry.query(&request, &query_opts).await;
        progress.keyword_queried(&keyword.text, items.len());
        groups.push((keyword.clone(), items));
    }

    // --- Filtering ---
    progress.stage(RunStage::Filtering);
    for (_, items) in &mut groups {
        *items = filters::apply_filters(std::mem::take(items), &config.filters, profile.age_bracket);
    }

    // --- Fallback: one broadened query when nothing survived ---
    let mut broadened_with = None;
    if groups.iter().all(|(_, items)| items.is_empty()) {
        let fallback = profile
            .selected_genres()
            .iter()
            .find_map(|genre| config.fallbacks.get(genre.label()).cloned());

        if let Some(fallback) = fallback {
            info!(%run_id, keyword = %fallback, "no items survived, broadening search once");
            let request = search_request(&fallback, config);
            let items = registry.query(&request, &query_opts).await;
            let items = filters::apply_filters(items, &config.filters, profile.age_bracket);
            progress.keyword_queried(&fallback, items.len());
            groups = vec![(Keyword::primary(fallback.clone()), items)];
            broadened_with = Some(fallback);
        }
    }

    if let Some(limit) = opts.limit {
        for (_, items) in &mut groups {
            items.truncate(limit);
        }
    }

    let mut result_groups: Vec<KeywordGroup> = groups
        .into_iter()
        .map(|(keyword, items)| KeywordGroup {
            keyword,
            items: items
                .into_iter()
                .map(|item| RecommendedItem {
                    item,
                    justification: None,
                })
                .collect(),
        })
        .collect();

    // --- Justification (optional, degrades per item) ---
    if let Some(client) = textgen.as_ref().filter(|_| opts.justify) {
        let summary = derived
            .summary
            .clone()
            .unwrap_or_else(|| profile.summary());
        justify::annotate_top(
            client,
            &summary,
            &mut result_groups,
            config.defaults.justify_top_n,
        )
        .await;
    }

    // --- Presenting ---
    progress.stage(RunStage::Presenting);
    let result = assemble(run_id, derived, result_groups, broadened_with);

    info!(
        run_id = %result.run_id,
        items = result.item_count(),
        broadened = result.broadened_with.is_some(),
        elapsed_ms = start.elapsed().as_millis(),
        "recommendation run complete"
    );

    Ok(result)
}

fn search_request(keyword: &str, config: &AppConfig) -> SearchRequest {
    SearchRequest {
        keyword: keyword.to_string(),
        max_results: config.defaults.max_results,
        language: config.defaults.language.clone(),
    }
}

fn assemble(
    run_id: RunId,
    derived: DerivedKeywords,
    groups: Vec<KeywordGroup>,
    broadened_with: Option<String>,
) -> RecommendationResult {
    RecommendationResult {
        run_id,
        generated_at: Utc::now(),
        profile_summary: derived.summary,
        groups,
        broadened_with,
    }
}
