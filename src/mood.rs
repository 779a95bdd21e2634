// Mood-aware query augmentation.
//
// A mood biases the similarity search by appending a fixed bag of
// mood-associated keywords to the query text. Unknown labels degrade to no
// augmentation rather than an error.

use serde::{Deserialize, Serialize};

/// The fixed set of moods a listener can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Chill,
    Sad,
    Energetic,
}

impl Mood {
    /// All moods in display order.
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Chill, Mood::Sad, Mood::Energetic];

    /// Keywords appended to the query for this mood, in fixed order.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["happy", "joy", "upbeat", "energetic", "positive"],
            Mood::Chill => &["relax", "calm", "peaceful", "smooth"],
            Mood::Sad => &["sad", "melancholy", "heartbreak", "emotional"],
            Mood::Energetic => &["party", "dance", "workout", "exciting"],
        }
    }

    /// Plain name, e.g. "Happy".
    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Chill => "Chill",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
        }
    }

    /// Display label with its emoji, e.g. "🌞 Happy".
    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "🌞 Happy",
            Mood::Chill => "😴 Chill",
            Mood::Sad => "💔 Sad",
            Mood::Energetic => "🔥 Energetic",
        }
    }

    /// Parse a mood from either its display label ("🔥 Energetic") or its
    /// plain name ("energetic"). Matching ignores case and any leading
    /// emoji or punctuation. Returns `None` for unrecognized labels.
    pub fn parse(label: &str) -> Option<Mood> {
        let name = label
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Append the mood's keywords to the query. No mood means no change.
pub fn augment(query: &str, mood: Option<Mood>) -> String {
    match mood {
        Some(mood) => format!("{} {}", query, mood.keywords().join(" ")),
        None => query.to_string(),
    }
}

/// Like [`augment`], but takes a raw label. Unrecognized labels are treated
/// as "no mood".
pub fn augment_with_label(query: &str, label: Option<&str>) -> String {
    augment(query, label.and_then(Mood::parse))
}
