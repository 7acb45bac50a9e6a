use serde::Serialize;
use std::collections::HashSet;

use super::sentiment::Sentiment;
use super::types::Prediction;
use crate::youtube::Comment;

/// Summary figures shown at the top of the results.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_comments: usize,
    pub unique_commenters: usize,
    /// Mean number of whitespace-separated words per comment.
    pub avg_word_length: f64,
    /// Mean sentiment mapped from -1..1 onto 0..10.
    pub avg_sentiment: f64,
}

impl Metrics {
    /// Empty input yields zeros rather than NaN.
    pub fn compute(comments: &[Comment], predictions: &[Prediction]) -> Self {
        let total_comments = comments.len();
        let unique_commenters = comments
            .iter()
            .map(|c| c.author_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let total_words: usize = comments
            .iter()
            .map(|c| c.text.split_whitespace().count())
            .sum();
        let avg_word_length = if total_comments == 0 {
            0.0
        } else {
            total_words as f64 / total_comments as f64
        };

        let avg_sentiment = if predictions.is_empty() {
            0.0
        } else {
            let total: i64 = predictions.iter().map(|p| p.sentiment.score() as i64).sum();
            let mean = total as f64 / predictions.len() as f64;
            (mean + 1.0) / 2.0 * 10.0
        };

        Self {
            total_comments,
            unique_commenters,
            avg_word_length,
            avg_sentiment,
        }
    }

    pub fn avg_word_length_display(&self) -> String {
        format!("{:.2}", self.avg_word_length)
    }

    pub fn avg_sentiment_display(&self) -> String {
        format!("{:.2}", self.avg_sentiment)
    }
}

/// Occurrences of each label. Serialized as `{"1": n, "0": n, "-1": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentCounts {
    #[serde(rename = "1")]
    pub positive: usize,
    #[serde(rename = "0")]
    pub neutral: usize,
    #[serde(rename = "-1")]
    pub negative: usize,
}

impl SentimentCounts {
    pub fn tally(predictions: &[Prediction]) -> Self {
        predictions
            .iter()
            .fold(Self::default(), |mut counts, p| {
                *counts.slot_mut(p.sentiment) += 1;
                counts
            })
    }

    fn slot_mut(&mut self, sentiment: Sentiment) -> &mut usize {
        match sentiment {
            Sentiment::Positive => &mut self.positive,
            Sentiment::Neutral => &mut self.neutral,
            Sentiment::Negative => &mut self.negative,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Share of `sentiment` in percent, 0 when nothing was counted.
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(sentiment) as f64 / total as f64 * 100.0,
        }
    }

    /// Rows for the sentiment table: label, count, formatted percentage.
    pub fn rows(&self) -> Vec<(Sentiment, usize, String)> {
        Sentiment::all()
            .iter()
            .map(|s| (*s, self.get(*s), format!("{:.2}%", self.percentage(*s))))
            .collect()
    }
}
