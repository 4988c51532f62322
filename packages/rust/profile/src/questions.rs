//! Survey question model: one closed enumeration per question.
//!
//! Branch logic works on variants, never on display labels, so labels can
//! change (or lose their emoji) without touching any matching code. Labels
//! are the exact strings shown on the survey form.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 1. Reading habit
// ---------------------------------------------------------------------------

/// "평소 독서 습관에 가장 가까운 것은?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingHabit {
    /// Reads often and enjoys it.
    Frequent,
    /// Reads occasionally, no habit.
    Occasional,
    /// Barely reads, wants to start.
    Curious,
    /// Recently decided to start reading.
    JustStarting,
}

impl ReadingHabit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Frequent => "📖 책 읽는 걸 좋아하고, 종종 읽는다",
            Self::Occasional => "🙂 가끔 읽긴 하지만 습관은 아니다",
            Self::Curious => "😅 거의 읽지 않지만, 한번 시작해보고 싶다",
            Self::JustStarting => "🆕 최근에 독서를 시작해보고 싶어졌다",
        }
    }

    /// Which question branch this habit activates.
    pub fn is_experienced(&self) -> bool {
        matches!(self, Self::Frequent | Self::Occasional)
    }
}

// ---------------------------------------------------------------------------
// 2a. Experienced branch
// ---------------------------------------------------------------------------

/// "선호하는 도서 분야를 골라주세요"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookGenre {
    KoreanFiction,
    ForeignFiction,
    Essay,
    Humanities,
    SelfImprovement,
    ScienceTech,
    Society,
    History,
    FantasySf,
    MysteryThriller,
}

impl BookGenre {
    pub fn label(&self) -> &'static str {
        match self {
            Self::KoreanFiction => "소설(한국)",
            Self::ForeignFiction => "소설(해외)",
            Self::Essay => "에세이",
            Self::Humanities => "인문·철학",
            Self::SelfImprovement => "경제·자기계발",
            Self::ScienceTech => "과학·기술",
            Self::Society => "사회·시사",
            Self::History => "역사",
            Self::FantasySf => "판타지/SF",
            Self::MysteryThriller => "추리/스릴러",
        }
    }

    /// Catalog-query-friendly term, without punctuation the APIs dislike.
    pub fn search_term(&self) -> &'static str {
        match self {
            Self::KoreanFiction => "한국 소설",
            Self::ForeignFiction => "해외 소설",
            Self::Essay => "에세이",
            Self::Humanities => "인문 철학",
            Self::SelfImprovement => "자기계발",
            Self::ScienceTech => "교양 과학",
            Self::Society => "사회 시사",
            Self::History => "역사",
            Self::FantasySf => "SF 판타지 소설",
            Self::MysteryThriller => "추리 스릴러 소설",
        }
    }
}

/// "책을 읽을 때 중요하게 생각하는 요소 (최대 2개)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingPriority {
    BeautifulProse,
    ImmersiveStory,
    ThoughtProvoking,
    LightRead,
    Realistic,
    StrongMessage,
}

impl ReadingPriority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BeautifulProse => "문장이 예쁜 책",
            Self::ImmersiveStory => "몰입감 있는 스토리",
            Self::ThoughtProvoking => "생각할 거리를 주는 책",
            Self::LightRead => "가볍게 읽히는 책",
            Self::Realistic => "현실적인 이야기",
            Self::StrongMessage => "강한 메시지와 여운",
        }
    }
}

// ---------------------------------------------------------------------------
// 2b. Newcomer branch
// ---------------------------------------------------------------------------

/// "책을 읽을 때 가장 걱정되는 점은?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingWorry {
    TooHard,
    Boring,
    TooLong,
    CannotFinish,
    DontKnowWhatToPick,
}

impl ReadingWorry {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TooHard => "너무 어려울까 봐",
            Self::Boring => "재미없을까 봐",
            Self::TooLong => "분량이 부담될까 봐",
            Self::CannotFinish => "끝까지 못 읽을까 봐",
            Self::DontKnowWhatToPick => "어떤 책을 골라야 할지 모르겠음",
        }
    }
}

/// "평소 더 자주 즐기는 콘텐츠는?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentMedium {
    Movie,
    Drama,
    Webtoon,
    Youtube,
    Music,
    Podcast,
}

impl ContentMedium {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "영화",
            Self::Drama => "드라마",
            Self::Webtoon => "웹툰",
            Self::Youtube => "유튜브",
            Self::Music => "음악",
            Self::Podcast => "팟캐스트",
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Music taste
// ---------------------------------------------------------------------------

/// "좋아하는 음악 장르"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MusicGenre {
    Ballad,
    HiphopRnb,
    IndieBand,
    Pop,
    Classical,
    Jazz,
    Ost,
    Edm,
}

impl MusicGenre {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ballad => "발라드",
            Self::HiphopRnb => "힙합/R&B",
            Self::IndieBand => "인디/밴드",
            Self::Pop => "팝",
            Self::Classical => "클래식",
            Self::Jazz => "재즈",
            Self::Ost => "OST",
            Self::Edm => "EDM/일렉트로닉",
        }
    }
}

/// "선호하는 음악 분위기 (최대 2개)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MusicMood {
    Emotional,
    Calm,
    Energetic,
    MelancholyComforting,
    DarkDeep,
    BrightHopeful,
}

impl MusicMood {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Emotional => "감성적",
            Self::Calm => "잔잔한",
            Self::Energetic => "에너지 넘치는",
            Self::MelancholyComforting => "우울하지만 위로되는",
            Self::DarkDeep => "어둡고 깊은",
            Self::BrightHopeful => "밝고 희망적인",
        }
    }

    /// Mood term usable inside a search keyword.
    pub fn search_term(&self) -> &'static str {
        match self {
            Self::Emotional => "감성",
            Self::Calm => "잔잔한",
            Self::Energetic => "경쾌한",
            Self::MelancholyComforting => "위로",
            Self::DarkDeep => "깊이 있는",
            Self::BrightHopeful => "희망적인",
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Movie taste
// ---------------------------------------------------------------------------

/// "좋아하는 영화 장르"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovieGenre {
    Drama,
    Romance,
    Action,
    FantasySf,
    CrimeThriller,
    Documentary,
    ComingOfAge,
    ArtFilm,
}

impl MovieGenre {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Drama => "드라마",
            Self::Romance => "로맨스",
            Self::Action => "액션",
            Self::FantasySf => "판타지/SF",
            Self::CrimeThriller => "범죄/스릴러",
            Self::Documentary => "다큐멘터리",
            Self::ComingOfAge => "성장 영화",
            Self::ArtFilm => "예술 영화",
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Reading goal
// ---------------------------------------------------------------------------

/// "지금 책을 읽고 싶은 가장 큰 이유는?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingGoal {
    Healing,
    BroadenThinking,
    Immersion,
    SelfReflection,
    Growth,
    LightReading,
}

impl ReadingGoal {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healing => "힐링 / 위로",
            Self::BroadenThinking => "생각의 폭을 넓히고 싶어서",
            Self::Immersion => "재미있게 몰입하고 싶어서",
            Self::SelfReflection => "나 자신을 돌아보고 싶어서",
            Self::Growth => "공부 / 성장 목적",
            Self::LightReading => "그냥 가볍게 읽고 싶어서",
        }
    }

    pub fn search_term(&self) -> &'static str {
        match self {
            Self::Healing => "힐링",
            Self::BroadenThinking => "생각의 폭",
            Self::Immersion => "몰입",
            Self::SelfReflection => "자기 성찰",
            Self::Growth => "성장",
            Self::LightReading => "가볍게 읽는",
        }
    }
}

// ---------------------------------------------------------------------------
// Age bracket & audience level
// ---------------------------------------------------------------------------

/// Audience level a title is classified into by the content filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudienceLevel {
    Child,
    Teen,
    Adult,
}

/// The user's declared age bracket, acting as an admission floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeBracket {
    Teen,
    AdultEntry,
    Adult,
}

impl AgeBracket {
    /// Admission policy: which audience levels this floor accepts.
    ///
    /// | floor       | admits       |
    /// |-------------|--------------|
    /// | teen        | teen, adult  |
    /// | adult-entry | adult, teen  |
    /// | adult       | adult only   |
    pub fn admits(&self, level: AudienceLevel) -> bool {
        match self {
            Self::Teen | Self::AdultEntry => {
                matches!(level, AudienceLevel::Teen | AudienceLevel::Adult)
            }
            Self::Adult => matches!(level, AudienceLevel::Adult),
        }
    }
}

// ---------------------------------------------------------------------------
// Survey outline (for CLI display)
// ---------------------------------------------------------------------------

/// One survey section as shown on the form.
#[derive(Debug, Clone)]
pub struct SurveySection {
    pub title: &'static str,
    pub prompt: &'static str,
    pub options: Vec<&'static str>,
    pub note: Option<&'static str>,
}

/// The full survey, in form order. Branch sections are listed one after the
/// other; which of 2a/2b applies depends on the answer to section 1.
pub fn survey_outline() -> Vec<SurveySection> {
    use ReadingHabit as H;
    vec![
        SurveySection {
            title: "1. 독서 경험",
            prompt: "평소 독서 습관에 가장 가까운 것은?",
            options: vec![
                H::Frequent.label(),
                H::Occasional.label(),
                H::Curious.label(),
                H::JustStarting.label(),
            ],
            note: None,
        },
        SurveySection {
            title: "2a. 독서 취향 (경험자)",
            prompt: "선호하는 도서 분야를 골라주세요",
            options: vec![
                BookGenre::KoreanFiction.label(),
                BookGenre::ForeignFiction.label(),
                BookGenre::Essay.label(),
                BookGenre::Humanities.label(),
                BookGenre::SelfImprovement.label(),
                BookGenre::ScienceTech.label(),
                BookGenre::Society.label(),
                BookGenre::History.label(),
                BookGenre::FantasySf.label(),
                BookGenre::MysteryThriller.label(),
            ],
            note: Some("중요 요소는 최대 2개까지 선택"),
        },
        SurveySection {
            title: "2b. 독서 취향 (입문자)",
            prompt: "책을 읽을 때 가장 걱정되는 점은?",
            options: vec![
                ReadingWorry::TooHard.label(),
                ReadingWorry::Boring.label(),
                ReadingWorry::TooLong.label(),
                ReadingWorry::CannotFinish.label(),
                ReadingWorry::DontKnowWhatToPick.label(),
            ],
            note: None,
        },
        SurveySection {
            title: "3. 음악 취향",
            prompt: "좋아하는 음악 장르와 분위기",
            options: vec![
                MusicGenre::Ballad.label(),
                MusicGenre::HiphopRnb.label(),
                MusicGenre::IndieBand.label(),
                MusicGenre::Pop.label(),
                MusicGenre::Classical.label(),
                MusicGenre::Jazz.label(),
                MusicGenre::Ost.label(),
                MusicGenre::Edm.label(),
            ],
            note: Some("분위기는 최대 2개까지 선택"),
        },
        SurveySection {
            title: "4. 영화 취향",
            prompt: "좋아하는 영화 장르",
            options: vec![
                MovieGenre::Drama.label(),
                MovieGenre::Romance.label(),
                MovieGenre::Action.label(),
                MovieGenre::FantasySf.label(),
                MovieGenre::CrimeThriller.label(),
                MovieGenre::Documentary.label(),
                MovieGenre::ComingOfAge.label(),
                MovieGenre::ArtFilm.label(),
            ],
            note: None,
        },
        SurveySection {
            title: "5. 독서 목적",
            prompt: "지금 책을 읽고 싶은 가장 큰 이유는?",
            options: vec![
                ReadingGoal::Healing.label(),
                ReadingGoal::BroadenThinking.label(),
                ReadingGoal::Immersion.label(),
                ReadingGoal::SelfReflection.label(),
                ReadingGoal::Growth.label(),
                ReadingGoal::LightReading.label(),
            ],
            note: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_branching_is_variant_based() {
        assert!(ReadingHabit::Frequent.is_experienced());
        assert!(ReadingHabit::Occasional.is_experienced());
        assert!(!ReadingHabit::Curious.is_experienced());
        assert!(!ReadingHabit::JustStarting.is_experienced());
    }

    #[test]
    fn genre_labels_match_form() {
        assert_eq!(BookGenre::ScienceTech.label(), "과학·기술");
        assert_eq!(BookGenre::KoreanFiction.label(), "소설(한국)");
    }

    #[test]
    fn search_terms_avoid_form_punctuation() {
        // Interpunct and parentheses from the display labels never reach
        // the query string.
        for genre in [
            BookGenre::KoreanFiction,
            BookGenre::Humanities,
            BookGenre::ScienceTech,
        ] {
            assert!(!genre.search_term().contains('·'));
            assert!(!genre.search_term().contains('('));
        }
    }

    #[test]
    fn age_policy_table() {
        use AudienceLevel as L;

        assert!(AgeBracket::Teen.admits(L::Teen));
        assert!(AgeBracket::Teen.admits(L::Adult));
        assert!(!AgeBracket::Teen.admits(L::Child));

        assert!(AgeBracket::AdultEntry.admits(L::Adult));
        assert!(AgeBracket::AdultEntry.admits(L::Teen));
        assert!(!AgeBracket::AdultEntry.admits(L::Child));

        assert!(AgeBracket::Adult.admits(L::Adult));
        assert!(!AgeBracket::Adult.admits(L::Teen));
        assert!(!AgeBracket::Adult.admits(L::Child));
    }

    #[test]
    fn enums_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&BookGenre::ScienceTech).unwrap(),
            "\"science-tech\""
        );
        assert_eq!(
            serde_json::to_string(&MusicMood::MelancholyComforting).unwrap(),
            "\"melancholy-comforting\""
        );
        let parsed: ReadingGoal = serde_json::from_str("\"healing\"").unwrap();
        assert_eq!(parsed, ReadingGoal::Healing);
    }

    #[test]
    fn survey_outline_covers_all_sections() {
        let outline = survey_outline();
        assert_eq!(outline.len(), 6);
        assert!(outline[0].options.len() == 4);
        assert!(outline[1].options.contains(&"과학·기술"));
    }
}
