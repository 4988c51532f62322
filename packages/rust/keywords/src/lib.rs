//! Keyword derivation: profile in, 1-3 search keywords out.
//!
//! Two strategies, selected by configuration:
//! - [`derive_deterministic`] concatenates a fixed priority-ordered subset
//!   of profile fields. No external call; always succeeds; may yield no
//!   keyword at all, which the caller treats as "no query".
//! - [`derive_generative`] sends the profile to the text-generation service
//!   and parses the completion per [`parser`]. A parse failure fails the
//!   run; there is no silent fallback to the deterministic strategy.

pub mod parser;

use tracing::{debug, instrument};

use bookmuse_profile::UserProfile;
use bookmuse_shared::{Keyword, Result, StrategyMode};
use bookmuse_textgen::TextgenClient;

pub use parser::{ParseSpec, parse_completion};

// ---------------------------------------------------------------------------
// DerivedKeywords
// ---------------------------------------------------------------------------

/// Output of one derivation: keywords plus the generative profile summary.
#[derive(Debug, Clone, Default)]
pub struct DerivedKeywords {
    /// One-line reader summary (shape-B generative output only).
    pub summary: Option<String>,
    /// Pairwise-distinct keywords in derivation order; may be empty.
    pub keywords: Vec<Keyword>,
}

impl DerivedKeywords {
    /// True when there is nothing to query.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Deterministic strategy
// ---------------------------------------------------------------------------

/// Concatenate first genre, goal term, and first music mood into one
/// primary keyword. Empty parts are skipped; an all-empty result yields no
/// keyword. Pure and idempotent.
pub fn derive_deterministic(profile: &UserProfile) -> DerivedKeywords {
    let parts: Vec<&str> = [
        profile.first_genre().map(|g| g.search_term()),
        Some(profile.goal.search_term()),
        profile.first_mood().map(|m| m.search_term()),
    ]
    .into_iter()
    .flatten()
    .filter(|p| !p.trim().is_empty())
    .collect();

    let text = parts.join(" ");
    debug!(keyword = %text, "deterministic keyword derived");

    if text.is_empty() {
        return DerivedKeywords::default();
    }

    DerivedKeywords {
        summary: None,
        keywords: vec![Keyword::primary(text)],
    }
}

// ---------------------------------------------------------------------------
// Generative strategy
// ---------------------------------------------------------------------------

/// Build the fixed instructional prompt for a profile.
pub fn build_prompt(profile: &UserProfile, spec: &ParseSpec) -> String {
    let variant_count = spec.max_keywords.saturating_sub(1);
    format!(
        "당신은 서점의 도서 큐레이터입니다. 아래 독자 프로필을 읽고, \
         도서 검색에 바로 쓸 수 있는 키워드를 제안해 주세요.\n\
         반드시 아래 형식의 세 줄로만 답하세요. 다른 설명은 쓰지 마세요.\n\n\
         {summary_label} <독자 성향 한 줄 요약>\n\
         {primary_label} <검색 키워드 1개, 2~4단어>\n\
         {variant_label} <추가 검색 키워드 최대 {variant_count}개, 쉼표로 구분>\n\n\
         독자 프로필: {profile}\n",
        summary_label = parser::SUMMARY_LABEL,
        primary_label = parser::PRIMARY_LABEL,
        variant_label = parser::VARIANT_LABEL,
        variant_count = variant_count,
        profile = profile.summary(),
    )
}

/// Ask the text-generation service for keywords and parse the completion.
#[instrument(skip_all)]
pub async fn derive_generative(
    client: &TextgenClient,
    profile: &UserProfile,
    spec: &ParseSpec,
) -> Result<DerivedKeywords> {
    let prompt = build_prompt(profile, spec);
    let completion = client.complete(&prompt).await?;
    parse_completion(&completion, spec)
}

/// Derive keywords using the configured strategy.
pub async fn derive(
    mode: StrategyMode,
    client: Option<&TextgenClient>,
    profile: &UserProfile,
    spec: &ParseSpec,
) -> Result<DerivedKeywords> {
    match (mode, client) {
        (StrategyMode::Deterministic, _) => Ok(derive_deterministic(profile)),
        (StrategyMode::Generative, Some(client)) => {
            derive_generative(client, profile, spec).await
        }
        (StrategyMode::Generative, None) => Err(bookmuse_shared::BookmuseError::config(
            "generative strategy selected but no text-generation client is available",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmuse_profile::{
        BookGenre, MusicMood, ReadingExperience, ReadingGoal, ReadingHabit, ReadingPriority,
        UserProfile,
    };
    use bookmuse_shared::BookmuseError;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_with(genres: Vec<BookGenre>, moods: Vec<MusicMood>) -> UserProfile {
        UserProfile {
            reading_habit: ReadingHabit::Frequent,
            experience: ReadingExperience::Experienced {
                recent_book: None,
                genres,
                priorities: vec![ReadingPriority::ImmersiveStory],
            },
            music_genres: vec![],
            music_moods: moods,
            movie_genres: vec![],
            favorite_movie: None,
            goal: ReadingGoal::Healing,
            age_bracket: None,
        }
    }

    #[test]
    fn deterministic_joins_genre_goal_mood_in_order() {
        let profile = profile_with(
            vec![BookGenre::KoreanFiction, BookGenre::Essay],
            vec![MusicMood::Calm],
        );
        let derived = derive_deterministic(&profile);
        assert_eq!(derived.keywords.len(), 1);
        assert_eq!(derived.keywords[0].text, "한국 소설 힐링 잔잔한");
    }

    #[test]
    fn deterministic_skips_missing_fields() {
        // No genre and no mood: the goal term stands alone.
        let profile = profile_with(vec![], vec![]);
        let derived = derive_deterministic(&profile);
        assert_eq!(derived.keywords[0].text, "힐링");
    }

    #[test]
    fn deterministic_is_idempotent() {
        let profile = profile_with(vec![BookGenre::ScienceTech], vec![MusicMood::BrightHopeful]);
        let first = derive_deterministic(&profile);
        let second = derive_deterministic(&profile);
        assert_eq!(first.keywords, second.keywords);
    }

    #[test]
    fn prompt_contains_labels_and_profile() {
        let profile = profile_with(vec![BookGenre::Essay], vec![]);
        let prompt = build_prompt(&profile, &ParseSpec::default());
        assert!(prompt.contains(parser::SUMMARY_LABEL));
        assert!(prompt.contains(parser::PRIMARY_LABEL));
        assert!(prompt.contains(parser::VARIANT_LABEL));
        assert!(prompt.contains("에세이"));
    }

    #[tokio::test]
    async fn generative_parses_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": {
                    "content": "독서성향: 잔잔한 독자\n대표추천: 힐링 에세이\n보조추천: 잔잔한 소설"
                } }]
            })))
            .mount(&server)
            .await;

        let config = bookmuse_shared::TextgenConfig {
            endpoint: server.uri(),
            ..Default::default()
        };
        let client = TextgenClient::new(&config, "sk-test".into(), 5).unwrap();
        let profile = profile_with(vec![BookGenre::Essay], vec![MusicMood::Calm]);

        let derived = derive_generative(&client, &profile, &ParseSpec::default())
            .await
            .unwrap();
        assert_eq!(derived.summary.as_deref(), Some("잔잔한 독자"));
        assert_eq!(derived.keywords.len(), 2);
    }

    #[tokio::test]
    async fn generative_surfaces_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "독서성향: 요약만 있고 키워드가 없다" } }]
            })))
            .mount(&server)
            .await;

        let config = bookmuse_shared::TextgenConfig {
            endpoint: server.uri(),
            ..Default::default()
        };
        let client = TextgenClient::new(&config, "sk-test".into(), 5).unwrap();
        let profile = profile_with(vec![], vec![]);

        let err = derive_generative(&client, &profile, &ParseSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BookmuseError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn generative_without_client_is_config_error() {
        let profile = profile_with(vec![], vec![]);
        let err = derive(StrategyMode::Generative, None, &profile, &ParseSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BookmuseError::Config { .. }));
    }
}
