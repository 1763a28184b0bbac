use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::genre::Genre;
use crate::guidance::ParentalGuidance;

/// Strict release date format used by the feed and the add form
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

pub const RATING_MIN: f32 = 0.0;
pub const RATING_MAX: f32 = 10.0;

/// Natural key of a catalog entry: (title, release).
///
/// Two records describe the same movie iff both components are equal. The key is
/// also the storage primary key, so editing the title of an existing movie creates
/// a new entity and leaves the old one behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub title: String,
    pub release: DateTime<Utc>,
}

impl Identity {
    pub fn new(title: impl Into<String>, release: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            release,
        }
    }

    /// Build an identity from a calendar date (midnight UTC)
    pub fn from_date(title: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(title, release_from_date(date))
    }

    /// Build an identity from a strict `YYYY-MM-DD` string
    pub fn parse(title: impl Into<String>, release: &str) -> Result<Self, chrono::ParseError> {
        let date = NaiveDate::parse_from_str(release, RELEASE_DATE_FORMAT)?;
        Ok(Self::from_date(title, date))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.title, self.release.format(RELEASE_DATE_FORMAT))
    }
}

/// Midnight UTC of the given day
pub fn release_from_date(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// True for hierarchical absolute URLs such as `https://host/path`
pub fn is_absolute_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => !parsed.cannot_be_a_base() && parsed.has_host(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub release: DateTime<Utc>,
    #[serde(default)]
    pub budget: Option<f64>, // Rows written through other paths may carry no budget
    pub duration_minutes: u32,
    pub genre: Genre,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<ParentalGuidance>,
    pub rating: f32, // 0.0 - 10.0
    pub watched: bool,
    pub poster_url: String,
}

impl MovieRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.title.clone(), self.release)
    }

    pub fn same_entity(&self, other: &MovieRecord) -> bool {
        self.title == other.title && self.release == other.release
    }

    pub fn matches(&self, identity: &Identity) -> bool {
        self.title == identity.title && self.release == identity.release
    }

    /// Release as a calendar date for display
    pub fn release_date(&self) -> NaiveDate {
        self.release.date_naive()
    }
}

impl fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Movie{{title='{}', release={}}}", self.title, self.release.format(RELEASE_DATE_FORMAT))
    }
}
