use reqwest::Url;
use std::fmt;

use crate::error::ValidationError;

const ID_LEN: usize = 11;
const PREFIXES: [&str; 2] = [
    "https://www.youtube.com/watch?v=",
    "https://youtube.com/watch?v=",
];

/// The 11-character id of a YouTube video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts only `https://[www.]youtube.com/watch?v=<id>` with `v` as the
    /// first query parameter, matched on the text as typed. Nothing is decoded
    /// or normalized before the match.
    pub fn from_url(url: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError {
            url: url.to_string(),
        };

        let rest = PREFIXES
            .iter()
            .find_map(|prefix| url.strip_prefix(*prefix))
            .ok_or_else(invalid)?;

        let id = rest.get(..ID_LEN).ok_or_else(invalid)?;
        let tail = &rest[ID_LEN..];
        if !is_video_id(id) || !(tail.is_empty() || tail.starts_with(['&', '#'])) {
            return Err(invalid());
        }

        // The remainder still has to be a well-formed URL.
        Url::parse(url).map_err(|_| invalid())?;

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_video_id(s: &str) -> bool {
    s.len() == ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
