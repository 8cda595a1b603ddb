//! Classification label definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category assigned to an image by the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    Nature,
    People,
    Anime,
    Marvel,
    Gods,
    Cars,
    Arts,
    Objects,
    /// Catch-all for anything outside the other eight categories
    Misc,
}

impl ClassificationLabel {
    /// All labels, in the order they are presented to the vision service.
    pub const ALL: &'static [ClassificationLabel] = &[
        ClassificationLabel::Nature,
        ClassificationLabel::People,
        ClassificationLabel::Anime,
        ClassificationLabel::Marvel,
        ClassificationLabel::Gods,
        ClassificationLabel::Cars,
        ClassificationLabel::Arts,
        ClassificationLabel::Objects,
        ClassificationLabel::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Nature => "nature",
            ClassificationLabel::People => "people",
            ClassificationLabel::Anime => "anime",
            ClassificationLabel::Marvel => "marvel",
            ClassificationLabel::Gods => "gods",
            ClassificationLabel::Cars => "cars",
            ClassificationLabel::Arts => "arts",
            ClassificationLabel::Objects => "objects",
            ClassificationLabel::Misc => "misc",
        }
    }

    /// Parse free-form model output strictly.
    ///
    /// Uses the first non-empty line, trimmed and lower-cased, with a single
    /// trailing period removed. Fails when that is not one of the nine labels.
    pub fn parse_response(text: &str) -> Result<Self, LabelParseError> {
        let first_line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        let candidate = first_line.strip_suffix('.').unwrap_or(first_line);

        candidate.parse()
    }

    /// Normalize free-form model output into a label.
    ///
    /// Same rules as [`ClassificationLabel::parse_response`], but anything
    /// that is not one of the nine labels collapses to
    /// [`ClassificationLabel::Misc`].
    pub fn from_response(text: &str) -> Self {
        Self::parse_response(text).unwrap_or(ClassificationLabel::Misc)
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassificationLabel {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nature" => Ok(ClassificationLabel::Nature),
            "people" => Ok(ClassificationLabel::People),
            "anime" => Ok(ClassificationLabel::Anime),
            "marvel" => Ok(ClassificationLabel::Marvel),
            "gods" => Ok(ClassificationLabel::Gods),
            "cars" => Ok(ClassificationLabel::Cars),
            "arts" => Ok(ClassificationLabel::Arts),
            "objects" => Ok(ClassificationLabel::Objects),
            "misc" => Ok(ClassificationLabel::Misc),
            _ => Err(LabelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown classification label: {0}")]
pub struct LabelParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_words_map_verbatim() {
        for label in ClassificationLabel::ALL {
            assert_eq!(ClassificationLabel::from_response(label.as_str()), *label);
            assert_eq!(label.to_string(), label.as_str());
        }
    }

    #[test]
    fn test_response_is_trimmed_and_lowercased() {
        assert_eq!(
            ClassificationLabel::from_response("  Cars \n"),
            ClassificationLabel::Cars
        );
        assert_eq!(
            ClassificationLabel::from_response("ANIME"),
            ClassificationLabel::Anime
        );
        assert_eq!(
            ClassificationLabel::from_response("nature."),
            ClassificationLabel::Nature
        );
        assert_eq!(
            ClassificationLabel::from_response("\n\npeople\nThe image shows a crowd."),
            ClassificationLabel::People
        );
    }

    #[test]
    fn test_unknown_responses_collapse_to_misc() {
        for text in ["", "   ", "dogs", "a red car", "cars and people", "I cannot tell"] {
            assert_eq!(
                ClassificationLabel::from_response(text),
                ClassificationLabel::Misc,
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("vehicles".parse::<ClassificationLabel>().is_err());
        assert_eq!(
            "Gods".parse::<ClassificationLabel>().unwrap(),
            ClassificationLabel::Gods
        );
    }

    #[test]
    fn test_parse_response_reads_first_line_only() {
        assert_eq!(
            ClassificationLabel::parse_response("misc\nno clear subject").unwrap(),
            ClassificationLabel::Misc
        );
        assert_eq!(
            ClassificationLabel::parse_response("\n Cars.\n").unwrap(),
            ClassificationLabel::Cars
        );
        assert!(ClassificationLabel::parse_response("misc..").is_err());
        assert!(ClassificationLabel::parse_response("a red car\ncars").is_err());
        assert!(ClassificationLabel::parse_response("").is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ClassificationLabel::Marvel).unwrap();
        assert_eq!(json, "\"marvel\"");
    }
}
