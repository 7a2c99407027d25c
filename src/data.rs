use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::columns;
use crate::constants::platform::{MAX_PLATFORM_LEN, REDDIT, TWITTER};
use crate::errors::SeriesError;

/// Validated platform identifier.
///
/// Identifiers are lowercase ASCII alphanumerics plus `_` and `-`. They are
/// used verbatim as the storage prefix segment, so anything that could
/// escape the prefix (`/`, `..`, whitespace) is rejected.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Platform(String);

impl Platform {
    /// Validate and wrap a platform identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, SeriesError> {
        let name = name.into();
        let invalid = |reason: &str| SeriesError::InvalidPlatform {
            name: name.clone(),
            reason: reason.to_string(),
        };
        if name.is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if name.len() > MAX_PLATFORM_LEN {
            return Err(invalid("identifier is too long"));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        {
            return Err(invalid(
                "only lowercase ascii letters, digits, '_' and '-' are allowed",
            ));
        }
        Ok(Self(name))
    }

    /// Twitter platform.
    pub fn twitter() -> Self {
        Self(TWITTER.to_string())
    }

    /// Reddit platform.
    pub fn reddit() -> Self {
        Self(REDDIT.to_string())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Platform {
    type Err = SeriesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Platform {
    type Error = SeriesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.0
    }
}

/// Metric selector exposed to presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Scorer output on its native scale.
    SentimentScore,
    /// Negative to positive, in [-1, 1].
    Polarity,
    /// Objective to subjective, in [0, 1].
    Subjectivity,
}

impl Metric {
    /// All selectable metrics in display order.
    pub const ALL: [Metric; 3] = [Metric::SentimentScore, Metric::Polarity, Metric::Subjectivity];

    /// Column holding this metric in stored partitions.
    pub fn column(self) -> &'static str {
        match self {
            Metric::SentimentScore => columns::SENTIMENT_SCORE,
            Metric::Polarity => columns::POLARITY,
            Metric::Subjectivity => columns::SUBJECTIVITY,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::SentimentScore => "Sentiment score",
            Metric::Polarity => "Polarity",
            Metric::Subjectivity => "Subjectivity",
        }
    }
}

/// One ingested post as written by upstream ingestion.
///
/// Sentiment metrics arrive precomputed; any of them may be missing when the
/// upstream scorer did not produce a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Platform that produced the post.
    pub source: Platform,
    /// Optional category label (subreddit for Reddit posts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    /// Post text or title.
    pub text: String,
    /// Scorer output; absent when the scorer produced nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    /// Polarity in [-1, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<f64>,
    /// Subjectivity in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjectivity: Option<f64>,
    /// Like count, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    /// Upvote count, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<i64>,
    /// Post creation time (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
}

impl RawRecord {
    /// Minimal record with only text and timestamp set.
    pub fn new(source: Platform, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            source,
            subreddit: None,
            text: text.into(),
            sentiment_score: None,
            polarity: None,
            subjectivity: None,
            likes: None,
            upvotes: None,
            timestamp,
        }
    }

    /// Set the sentiment score.
    pub fn with_sentiment(mut self, score: f64) -> Self {
        self.sentiment_score = Some(score);
        self
    }

    /// Set polarity and subjectivity.
    pub fn with_polarity_subjectivity(mut self, polarity: f64, subjectivity: f64) -> Self {
        self.polarity = Some(polarity);
        self.subjectivity = Some(subjectivity);
        self
    }
}
