//! Per-item justification annotation.
//!
//! One text-generation call per surviving item, bounded to the configured
//! top N. A failed call degrades to the generic justification; it never
//! removes the item or fails the run.

use tracing::{debug, instrument, warn};

use bookmuse_shared::{CatalogItem, KeywordGroup};
use bookmuse_textgen::TextgenClient;

/// Static fallback when a justification call fails.
pub const GENERIC_JUSTIFICATION: &str = "프로필과 잘 어울려서 골라본 책이에요.";

/// Build the justification prompt for one item.
pub fn build_prompt(profile_summary: &str, item: &CatalogItem) -> String {
    let description = if item.description.is_empty() {
        "(소개 없음)"
    } else {
        &item.description
    };
    format!(
        "독자 프로필: {profile_summary}\n\
         책 제목: {title}\n\
         책 소개: {description}\n\n\
         이 독자에게 이 책을 권하는 이유를 한국어 한두 문장으로 써 주세요. \
         문장 외에 다른 내용은 쓰지 마세요.",
        title = item.title,
    )
}

/// Annotate up to `top_n` items across the groups, in presentation order.
#[instrument(skip_all, fields(top_n = top_n))]
pub async fn annotate_top(
    client: &TextgenClient,
    profile_summary: &str,
    groups: &mut [KeywordGroup],
    top_n: usize,
) {
    let mut budget = top_n;

    for group in groups.iter_mut() {
        for entry in group.items.iter_mut() {
            if budget == 0 {
                return;
            }
            budget -= 1;

            let prompt = build_prompt(profile_summary, &entry.item);
            match client.complete(&prompt).await {
                Ok(text) => {
                    debug!(title = %entry.item.title, "justification generated");
                    entry.justification = Some(text.trim().to_string());
                }
                Err(e) => {
                    warn!(title = %entry.item.title, error = %e, "justification failed, using generic text");
                    entry.justification = Some(GENERIC_JUSTIFICATION.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmuse_shared::{Keyword, RecommendedItem, SourceId, TextgenConfig};
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn group_with(titles: &[&str]) -> KeywordGroup {
        KeywordGroup {
            keyword: Keyword::primary("키워드"),
            items: titles
                .iter()
                .map(|t| RecommendedItem {
                    item: bookmuse_shared::CatalogItem::normalized(
                        (*t).into(),
                        vec!["저자".into()],
                        None,
                        None,
                        None,
                        Some("소개".into()),
                        SourceId::Kakao,
                    ),
                    justification: None,
                })
                .collect(),
        }
    }

    async fn client_for(server: &MockServer) -> TextgenClient {
        let config = TextgenConfig {
            endpoint: server.uri(),
            ..Default::default()
        };
        TextgenClient::new(&config, "sk-test".into(), 5).unwrap()
    }

    #[test]
    fn prompt_includes_profile_and_item() {
        let item = bookmuse_shared::CatalogItem::normalized(
            "코스모스".into(),
            vec!["칼 세이건".into()],
            None,
            None,
            None,
            Some("우주 교양서".into()),
            SourceId::GoogleBooks,
        );
        let prompt = build_prompt("과학을 좋아하는 독자", &item);
        assert!(prompt.contains("과학을 좋아하는 독자"));
        assert!(prompt.contains("코스모스"));
        assert!(prompt.contains("우주 교양서"));
    }

    #[tokio::test]
    async fn annotation_attaches_generated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "  잔잔한 위로가 필요할 때 꼭 맞는 책이에요.  " } }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut groups = vec![group_with(&["아무튼, 산책"])];
        annotate_top(&client, "요약", &mut groups, 3).await;

        assert_eq!(
            groups[0].items[0].justification.as_deref(),
            Some("잔잔한 위로가 필요할 때 꼭 맞는 책이에요.")
        );
    }

    #[tokio::test]
    async fn failure_degrades_to_generic_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut groups = vec![group_with(&["어떤 책"])];
        annotate_top(&client, "요약", &mut groups, 3).await;

        // The item survives with the generic justification.
        assert_eq!(
            groups[0].items[0].justification.as_deref(),
            Some(GENERIC_JUSTIFICATION)
        );
    }

    #[tokio::test]
    async fn annotation_respects_top_n_bound() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "좋아요" } }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut groups = vec![group_with(&["책1", "책2", "책3", "책4"])];
        annotate_top(&client, "요약", &mut groups, 2).await;

        assert!(groups[0].items[0].justification.is_some());
        assert!(groups[0].items[1].justification.is_some());
        assert!(groups[0].items[2].justification.is_none());
        assert!(groups[0].items[3].justification.is_none());
    }
}
