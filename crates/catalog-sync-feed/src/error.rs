use std::fmt;
use thiserror::Error;

/// Fetch failed: connectivity, non-2xx status, or unreadable body
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The payload as a whole is unusable
#[derive(Debug, Error)]
pub enum BatchParseError {
    #[error("feed is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("feed must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

/// Keys of a feed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedField {
    /// The element itself (not an object)
    Element,
    Title,
    Budget,
    Release,
    Rating,
    Poster,
    Duration,
    Genre,
    Watched,
    Guidance,
}

impl FeedField {
    pub fn key(&self) -> &'static str {
        match self {
            FeedField::Element => "<element>",
            FeedField::Title => "title",
            FeedField::Budget => "budget",
            FeedField::Release => "release",
            FeedField::Rating => "rating",
            FeedField::Poster => "poster",
            FeedField::Duration => "duration",
            FeedField::Genre => "genre",
            FeedField::Watched => "watched",
            FeedField::Guidance => "guidance",
        }
    }
}

impl fmt::Display for FeedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    Missing,
    NotAnObject,
    WrongType { expected: &'static str },
    Invalid(String),
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Missing => write!(f, "is missing"),
            FieldErrorKind::NotAnObject => write!(f, "is not a JSON object"),
            FieldErrorKind::WrongType { expected } => write!(f, "must be a {}", expected),
            FieldErrorKind::Invalid(reason) => write!(f, "is invalid: {}", reason),
        }
    }
}

/// One feed element was rejected because of a single field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element {index}: '{field}' {kind}")]
pub struct FieldError {
    pub index: usize,
    pub field: FeedField,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(index: usize, field: FeedField, kind: FieldErrorKind) -> Self {
        Self { index, field, kind }
    }
}
