use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Classifier output for a single comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Numeric value used for averaging and sorting.
    pub fn score(&self) -> i32 {
        match self {
            Sentiment::Positive => 1,
            Sentiment::Neutral => 0,
            Sentiment::Negative => -1,
        }
    }

    /// Label used by the classifier and renderer wire formats.
    pub fn wire_label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "1",
            Sentiment::Neutral => "0",
            Sentiment::Negative => "-1",
        }
    }

    pub fn from_score(score: i64) -> Option<Self> {
        match score {
            1 => Some(Sentiment::Positive),
            0 => Some(Sentiment::Neutral),
            -1 => Some(Sentiment::Negative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn all() -> &'static [Sentiment] {
        &[Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative]
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_label())
    }
}

/// The classifier may send the label as `"1"` or as `1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Number(i64),
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let score = match RawLabel::deserialize(deserializer)? {
            RawLabel::Number(n) => Some(n),
            RawLabel::Text(s) => s.trim().parse::<i64>().ok(),
        };
        score
            .and_then(Sentiment::from_score)
            .ok_or_else(|| de::Error::custom("sentiment label must be one of \"1\", \"0\", \"-1\""))
    }
}
