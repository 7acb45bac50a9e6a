use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{Prediction, Sentiment};

/// Which predictions the comment list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Positive,
    Neutral,
    Negative,
}

impl Filter {
    pub fn matches(&self, sentiment: Sentiment) -> bool {
        match self {
            Filter::All => true,
            Filter::Positive => sentiment == Sentiment::Positive,
            Filter::Neutral => sentiment == Sentiment::Neutral,
            Filter::Negative => sentiment == Sentiment::Negative,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Positive => "positive",
            Filter::Neutral => "neutral",
            Filter::Negative => "negative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All Comments",
            Filter::Positive => "Positive",
            Filter::Neutral => "Neutral",
            Filter::Negative => "Negative",
        }
    }

    pub fn all() -> &'static [Filter] {
        &[Filter::All, Filter::Positive, Filter::Neutral, Filter::Negative]
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown filter: {}", s))
    }
}

/// Predictions matching `filter`, most positive first.
///
/// The sort is stable, so equal sentiments keep their original order.
pub fn present(predictions: &[Prediction], filter: Filter) -> Vec<&Prediction> {
    let mut selected: Vec<&Prediction> = predictions
        .iter()
        .filter(|p| filter.matches(p.sentiment))
        .collect();
    selected.sort_by_key(|p| std::cmp::Reverse(p.sentiment.score()));
    selected
}

/// e.g. `Jan 5, 2024, 03:07 PM`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::prediction;

    fn texts(items: &[&Prediction]) -> Vec<String> {
        items.iter().map(|p| p.comment.clone()).collect()
    }

    #[test]
    fn positive_filter_keeps_relative_order() {
        let predictions = vec![
            prediction("first", Sentiment::Positive),
            prediction("meh", Sentiment::Neutral),
            prediction("bad", Sentiment::Negative),
            prediction("second", Sentiment::Positive),
        ];

        let shown = present(&predictions, Filter::Positive);
        assert_eq!(texts(&shown), vec!["first", "second"]);
    }

    #[test]
    fn all_sorts_positive_to_negative_stably() {
        let predictions = vec![
            prediction("n1", Sentiment::Negative),
            prediction("z1", Sentiment::Neutral),
            prediction("p1", Sentiment::Positive),
            prediction("n2", Sentiment::Negative),
            prediction("p2", Sentiment::Positive),
            prediction("z2", Sentiment::Neutral),
        ];

        let shown = present(&predictions, Filter::All);
        assert_eq!(texts(&shown), vec!["p1", "p2", "z1", "z2", "n1", "n2"]);
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_input_alone() {
        let predictions = vec![
            prediction("a", Sentiment::Negative),
            prediction("b", Sentiment::Positive),
            prediction("c", Sentiment::Negative),
        ];
        let before = predictions.clone();

        for filter in Filter::all() {
            let once = present(&predictions, *filter);
            let twice = present(&predictions, *filter);
            assert_eq!(once, twice);
        }
        assert_eq!(predictions, before);
    }

    #[test]
    fn empty_selection() {
        let predictions = vec![prediction("a", Sentiment::Positive)];
        assert!(present(&predictions, Filter::Negative).is_empty());
        assert!(present(&[], Filter::All).is_empty());
    }

    #[test]
    fn filter_parses_from_query_values() {
        assert_eq!("neutral".parse::<Filter>(), Ok(Filter::Neutral));
        assert_eq!("all".parse::<Filter>(), Ok(Filter::All));
        assert!("Positive".parse::<Filter>().is_err());
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn timestamps_render_in_short_form() {
        let ts: DateTime<Utc> = "2024-01-05T15:07:00Z".parse().unwrap();
        assert_eq!(format_timestamp(&ts), "Jan 5, 2024, 03:07 PM");
    }
}
