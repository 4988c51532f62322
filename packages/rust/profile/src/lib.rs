//! Typed survey profile for bookmuse.
//!
//! The experienced/newcomer branch is a tagged enum, so questions that are
//! inactive for a branch are structurally absent rather than null. The form
//! surface validates answers before they get here; [`UserProfile::validate`]
//! re-checks the structural invariants (selection bounds, branch
//! consistency) at the pipeline boundary.

pub mod questions;

use serde::{Deserialize, Serialize};

use bookmuse_shared::{BookmuseError, Result};

pub use questions::{
    AgeBracket, AudienceLevel, BookGenre, ContentMedium, MovieGenre, MusicGenre, MusicMood,
    ReadingGoal, ReadingHabit, ReadingPriority, ReadingWorry, SurveySection, survey_outline,
};

/// Maximum selections for the "important factors" multi-select.
pub const MAX_PRIORITIES: usize = 2;

/// Maximum selections for the music-mood multi-select.
pub const MAX_MOODS: usize = 2;

// ---------------------------------------------------------------------------
// ReadingExperience
// ---------------------------------------------------------------------------

/// Answers to the branch-specific second section of the survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "kebab-case")]
pub enum ReadingExperience {
    /// Active for [`ReadingHabit::Frequent`] and [`ReadingHabit::Occasional`].
    Experienced {
        /// "최근에 인상 깊게 읽은 책" (free text, optional).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recent_book: Option<String>,
        /// Preferred book genres.
        #[serde(default)]
        genres: Vec<BookGenre>,
        /// Important reading factors, at most [`MAX_PRIORITIES`].
        #[serde(default)]
        priorities: Vec<ReadingPriority>,
    },
    /// Active for the remaining habit levels.
    Newcomer {
        /// Biggest worry about reading.
        worry: ReadingWorry,
        /// Content the user already enjoys.
        #[serde(default)]
        media: Vec<ContentMedium>,
    },
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// Structured record of one user's survey answers.
///
/// `experience` comes last so TOML serialization emits plain values before
/// the branch table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserProfile {
    pub reading_habit: ReadingHabit,
    #[serde(default)]
    pub music_genres: Vec<MusicGenre>,
    /// At most [`MAX_MOODS`] entries.
    #[serde(default)]
    pub music_moods: Vec<MusicMood>,
    #[serde(default)]
    pub movie_genres: Vec<MovieGenre>,
    /// "기억에 남는 영화" (free text, optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_movie: Option<String>,
    pub goal: ReadingGoal,
    /// Declared age bracket; enables the audience-level filter when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_bracket: Option<AgeBracket>,
    pub experience: ReadingExperience,
}

impl UserProfile {
    /// Check structural invariants: selection bounds and that the answered
    /// branch matches the declared reading habit.
    pub fn validate(&self) -> Result<()> {
        if self.music_moods.len() > MAX_MOODS {
            return Err(BookmuseError::validation(format!(
                "at most {MAX_MOODS} music moods may be selected, got {}",
                self.music_moods.len()
            )));
        }

        match (&self.experience, self.reading_habit.is_experienced()) {
            (ReadingExperience::Experienced { priorities, .. }, true) => {
                if priorities.len() > MAX_PRIORITIES {
                    return Err(BookmuseError::validation(format!(
                        "at most {MAX_PRIORITIES} reading priorities may be selected, got {}",
                        priorities.len()
                    )));
                }
                Ok(())
            }
            (ReadingExperience::Newcomer { .. }, false) => Ok(()),
            (ReadingExperience::Experienced { .. }, false) => Err(BookmuseError::validation(
                "experienced-branch answers given for a newcomer reading habit",
            )),
            (ReadingExperience::Newcomer { .. }, true) => Err(BookmuseError::validation(
                "newcomer-branch answers given for an experienced reading habit",
            )),
        }
    }

    /// Selected book genres; empty for the newcomer branch.
    pub fn selected_genres(&self) -> &[BookGenre] {
        match &self.experience {
            ReadingExperience::Experienced { genres, .. } => genres,
            ReadingExperience::Newcomer { .. } => &[],
        }
    }

    /// First selected genre, if any. Anchors the deterministic keyword.
    pub fn first_genre(&self) -> Option<BookGenre> {
        self.selected_genres().first().copied()
    }

    /// First selected music mood, if any.
    pub fn first_mood(&self) -> Option<MusicMood> {
        self.music_moods.first().copied()
    }

    /// Compact one-paragraph summary of the profile, used inside
    /// text-generation prompts. Korean, matching the survey language.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.push(format!("독서 습관: {}", self.reading_habit.label()));

        match &self.experience {
            ReadingExperience::Experienced {
                recent_book,
                genres,
                priorities,
            } => {
                if !genres.is_empty() {
                    parts.push(format!("선호 분야: {}", join_labels(genres, BookGenre::label)));
                }
                if !priorities.is_empty() {
                    parts.push(format!(
                        "중요 요소: {}",
                        join_labels(priorities, ReadingPriority::label)
                    ));
                }
                if let Some(book) = recent_book.as_deref().filter(|b| !b.trim().is_empty()) {
                    parts.push(format!("인상 깊게 읽은 책: {}", book.trim()));
                }
            }
            ReadingExperience::Newcomer { worry, media } => {
                parts.push(format!("독서 걱정: {}", worry.label()));
                if !media.is_empty() {
                    parts.push(format!(
                        "즐기는 콘텐츠: {}",
                        join_labels(media, ContentMedium::label)
                    ));
                }
            }
        }

        if !self.music_genres.is_empty() {
            parts.push(format!(
                "음악 장르: {}",
                join_labels(&self.music_genres, MusicGenre::label)
            ));
        }
        if !self.music_moods.is_empty() {
            parts.push(format!(
                "음악 분위기: {}",
                join_labels(&self.music_moods, MusicMood::label)
            ));
        }
        if !self.movie_genres.is_empty() {
            parts.push(format!(
                "영화 장르: {}",
                join_labels(&self.movie_genres, MovieGenre::label)
            ));
        }
        if let Some(movie) = self.favorite_movie.as_deref().filter(|m| !m.trim().is_empty()) {
            parts.push(format!("기억에 남는 영화: {}", movie.trim()));
        }

        parts.push(format!("독서 목적: {}", self.goal.label()));

        parts.join(" / ")
    }
}

fn join_labels<T: Copy>(items: &[T], label: fn(&T) -> &'static str) -> String {
    items.iter().map(label).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experienced_profile() -> UserProfile {
        UserProfile {
            reading_habit: ReadingHabit::Frequent,
            experience: ReadingExperience::Experienced {
                recent_book: Some("물고기는 존재하지 않는다".into()),
                genres: vec![BookGenre::Essay, BookGenre::ScienceTech],
                priorities: vec![ReadingPriority::BeautifulProse],
            },
            music_genres: vec![MusicGenre::IndieBand],
            music_moods: vec![MusicMood::Calm],
            movie_genres: vec![MovieGenre::Drama],
            favorite_movie: None,
            goal: ReadingGoal::Healing,
            age_bracket: Some(AgeBracket::Adult),
        }
    }

    #[test]
    fn valid_profile_passes() {
        experienced_profile().validate().expect("valid profile");
    }

    #[test]
    fn too_many_moods_rejected() {
        let mut profile = experienced_profile();
        profile.music_moods = vec![
            MusicMood::Calm,
            MusicMood::Emotional,
            MusicMood::BrightHopeful,
        ];
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("music moods"));
    }

    #[test]
    fn too_many_priorities_rejected() {
        let mut profile = experienced_profile();
        profile.experience = ReadingExperience::Experienced {
            recent_book: None,
            genres: vec![],
            priorities: vec![
                ReadingPriority::LightRead,
                ReadingPriority::Realistic,
                ReadingPriority::StrongMessage,
            ],
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn branch_must_match_habit() {
        let mut profile = experienced_profile();
        profile.reading_habit = ReadingHabit::Curious;
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("experienced-branch"));

        let newcomer = UserProfile {
            reading_habit: ReadingHabit::Frequent,
            experience: ReadingExperience::Newcomer {
                worry: ReadingWorry::TooHard,
                media: vec![ContentMedium::Webtoon],
            },
            music_genres: vec![],
            music_moods: vec![],
            movie_genres: vec![],
            favorite_movie: None,
            goal: ReadingGoal::Immersion,
            age_bracket: None,
        };
        assert!(newcomer.validate().is_err());
    }

    #[test]
    fn newcomer_has_no_genres() {
        let profile = UserProfile {
            reading_habit: ReadingHabit::JustStarting,
            experience: ReadingExperience::Newcomer {
                worry: ReadingWorry::DontKnowWhatToPick,
                media: vec![ContentMedium::Movie],
            },
            music_genres: vec![],
            music_moods: vec![],
            movie_genres: vec![],
            favorite_movie: None,
            goal: ReadingGoal::LightReading,
            age_bracket: None,
        };
        assert!(profile.selected_genres().is_empty());
        assert!(profile.first_genre().is_none());
    }

    #[test]
    fn summary_mentions_branch_answers() {
        let summary = experienced_profile().summary();
        assert!(summary.contains("에세이"));
        assert!(summary.contains("물고기는 존재하지 않는다"));
        assert!(summary.contains("힐링"));

        let newcomer = UserProfile {
            reading_habit: ReadingHabit::Curious,
            experience: ReadingExperience::Newcomer {
                worry: ReadingWorry::Boring,
                media: vec![ContentMedium::Youtube],
            },
            music_genres: vec![],
            music_moods: vec![],
            movie_genres: vec![],
            favorite_movie: Some("인터스텔라".into()),
            goal: ReadingGoal::Immersion,
            age_bracket: None,
        };
        let summary = newcomer.summary();
        assert!(summary.contains("재미없을까 봐"));
        assert!(summary.contains("인터스텔라"));
    }

    #[test]
    fn profile_toml_roundtrip() {
        let toml_str = r#"
reading-habit = "frequent"
music-genres = ["ballad", "ost"]
music-moods = ["calm"]
movie-genres = ["romance"]
goal = "healing"
age-bracket = "adult-entry"

[experience]
branch = "experienced"
genres = ["korean-fiction"]
priorities = ["immersive-story"]
"#;
        let profile: UserProfile = toml::from_str(toml_str).expect("parse profile");
        profile.validate().expect("valid");
        assert_eq!(profile.first_genre(), Some(BookGenre::KoreanFiction));
        assert_eq!(profile.age_bracket, Some(AgeBracket::AdultEntry));

        let back = toml::to_string(&profile).expect("serialize");
        let reparsed: UserProfile = toml::from_str(&back).expect("reparse");
        assert_eq!(reparsed.music_genres, profile.music_genres);
    }
}
