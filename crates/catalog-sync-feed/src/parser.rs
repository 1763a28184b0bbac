use catalog_sync_models::{
    is_absolute_url, release_from_date, Clock, Genre, MovieRecord, ParentalGuidance, ReleaseDatePolicy, RATING_MAX, RATING_MIN,
    RELEASE_DATE_FORMAT,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::iter::Enumerate;
use tracing::{debug, info, warn};
use crate::error::{BatchParseError, FeedField, FieldError, FieldErrorKind};

/// A release date that failed strict parsing and was replaced by the calendar day
/// of parsing, at midnight UTC.
///
/// Not an error: the record is kept. Reported separately so callers can tell the
/// fallback apart from genuinely rejected elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DateLeniencyEvent {
    pub index: usize,
    pub title: String,
    pub raw: String,
    pub substituted: DateTime<Utc>,
}

/// A feed element that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMovie {
    pub record: MovieRecord,
    pub leniency: Option<DateLeniencyEvent>,
}

pub struct FeedParser<'a> {
    clock: &'a dyn Clock,
    policy: ReleaseDatePolicy,
}

impl<'a> FeedParser<'a> {
    pub fn new(clock: &'a dyn Clock, policy: ReleaseDatePolicy) -> Self {
        Self { clock, policy }
    }

    /// Split the payload into per-element results.
    ///
    /// Fails only when the payload is not a JSON array; element problems surface
    /// lazily as `Err(FieldError)` items while iterating.
    pub fn entries(&self, raw: &str) -> Result<FeedEntries<'a>, BatchParseError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Array(items) => {
                debug!(operation = "feed_parse", elements = items.len(), "Feed payload is an array");
                Ok(FeedEntries {
                    items: items.into_iter().enumerate(),
                    clock: self.clock,
                    policy: self.policy,
                })
            }
            other => Err(BatchParseError::NotAnArray {
                found: json_type_name(&other),
            }),
        }
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedFeed, BatchParseError> {
        Ok(ParsedFeed::collect_from(self.entries(raw)?))
    }
}

/// Lazy sequence over the elements of one fetched payload
pub struct FeedEntries<'a> {
    items: Enumerate<std::vec::IntoIter<Value>>,
    clock: &'a dyn Clock,
    policy: ReleaseDatePolicy,
}

impl Iterator for FeedEntries<'_> {
    type Item = Result<ParsedMovie, FieldError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, value) = self.items.next()?;
        let parsed = parse_element(index, value, self.clock, self.policy);
        match &parsed {
            Ok(ParsedMovie { leniency: Some(event), .. }) => {
                warn!(
                    operation = "date_leniency",
                    index = event.index,
                    title = %event.title,
                    raw = %event.raw,
                    substituted = %event.substituted,
                    "Release date is not YYYY-MM-DD, using date of parsing"
                );
            }
            Err(e) => {
                warn!(
                    operation = "field_error",
                    index = e.index,
                    field = %e.field,
                    error = %e.kind,
                    "Skipping feed element"
                );
            }
            Ok(_) => {}
        }
        Some(parsed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

/// Everything one payload produced, split by outcome
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub records: Vec<MovieRecord>,
    pub field_errors: Vec<FieldError>,
    pub lenient_dates: Vec<DateLeniencyEvent>,
}

impl ParsedFeed {
    pub fn collect_from<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Result<ParsedMovie, FieldError>>,
    {
        let mut feed = ParsedFeed::default();
        for entry in entries {
            match entry {
                Ok(parsed) => {
                    if let Some(event) = parsed.leniency {
                        feed.lenient_dates.push(event);
                    }
                    feed.records.push(parsed.record);
                }
                Err(e) => feed.field_errors.push(e),
            }
        }

        info!(
            operation = "feed_parse",
            accepted = feed.records.len(),
            rejected = feed.field_errors.len(),
            lenient_dates = feed.lenient_dates.len(),
            "Parsed movie feed"
        );
        feed
    }

    pub fn total(&self) -> usize {
        self.records.len() + self.field_errors.len()
    }
}

fn parse_element(
    index: usize,
    value: Value,
    clock: &dyn Clock,
    policy: ReleaseDatePolicy,
) -> Result<ParsedMovie, FieldError> {
    let obj = match value {
        Value::Object(map) => map,
        _ => return Err(FieldError::new(index, FeedField::Element, FieldErrorKind::NotAnObject)),
    };

    let title = string_field(&obj, index, FeedField::Title)?;
    if title.trim().is_empty() {
        return Err(invalid(index, FeedField::Title, "must not be empty"));
    }

    let budget = number_field(&obj, index, FeedField::Budget)?;
    if !budget.is_finite() || budget <= 0.0 {
        return Err(invalid(index, FeedField::Budget, format!("{} is not a positive amount", budget)));
    }

    let release_raw = string_field(&obj, index, FeedField::Release)?;
    let (release, leniency) = match NaiveDate::parse_from_str(release_raw, RELEASE_DATE_FORMAT) {
        Ok(date) => (release_from_date(date), None),
        Err(e) => match policy {
            ReleaseDatePolicy::Lenient => {
                // Day granularity keeps the identity stable across syncs on the same day
                let today = release_from_date(clock.now().date_naive());
                let event = DateLeniencyEvent {
                    index,
                    title: title.to_string(),
                    raw: release_raw.to_string(),
                    substituted: today,
                };
                (today, Some(event))
            }
            ReleaseDatePolicy::Strict => {
                return Err(invalid(index, FeedField::Release, format!("'{}' is not YYYY-MM-DD: {}", release_raw, e)));
            }
        },
    };

    let rating = number_field(&obj, index, FeedField::Rating)?;
    // Range check before narrowing, 10.00000001 would otherwise round to 10.0
    if !(f64::from(RATING_MIN)..=f64::from(RATING_MAX)).contains(&rating) {
        return Err(invalid(index, FeedField::Rating, format!("{} is outside {}-{}", rating, RATING_MIN, RATING_MAX)));
    }
    let rating = rating as f32;

    let poster = string_field(&obj, index, FeedField::Poster)?;
    if !is_absolute_url(poster) {
        return Err(invalid(index, FeedField::Poster, format!("'{}' is not an absolute URL", poster)));
    }

    let duration_minutes = duration_field(&obj, index)?;

    let genre = string_field(&obj, index, FeedField::Genre)?
        .parse::<Genre>()
        .map_err(|e| invalid(index, FeedField::Genre, e.to_string()))?;

    let watched = match required(&obj, index, FeedField::Watched)? {
        Value::Bool(b) => *b,
        _ => return Err(wrong_type(index, FeedField::Watched, "boolean")),
    };

    let guidance = string_field(&obj, index, FeedField::Guidance)?
        .parse::<ParentalGuidance>()
        .map_err(|e| invalid(index, FeedField::Guidance, e.to_string()))?;

    Ok(ParsedMovie {
        record: MovieRecord {
            title: title.to_string(),
            release,
            budget: Some(budget),
            duration_minutes,
            genre,
            guidance: Some(guidance),
            rating,
            watched,
            poster_url: poster.to_string(),
        },
        leniency,
    })
}

fn required<'v>(obj: &'v Map<String, Value>, index: usize, field: FeedField) -> Result<&'v Value, FieldError> {
    match obj.get(field.key()) {
        None | Some(Value::Null) => Err(FieldError::new(index, field, FieldErrorKind::Missing)),
        Some(value) => Ok(value),
    }
}

fn string_field<'v>(obj: &'v Map<String, Value>, index: usize, field: FeedField) -> Result<&'v str, FieldError> {
    required(obj, index, field)?
        .as_str()
        .ok_or_else(|| wrong_type(index, field, "string"))
}

fn number_field(obj: &Map<String, Value>, index: usize, field: FeedField) -> Result<f64, FieldError> {
    required(obj, index, field)?
        .as_f64()
        .ok_or_else(|| wrong_type(index, field, "number"))
}

fn duration_field(obj: &Map<String, Value>, index: usize) -> Result<u32, FieldError> {
    let value = required(obj, index, FeedField::Duration)?;
    if let Some(minutes) = value.as_u64() {
        return u32::try_from(minutes)
            .map_err(|_| invalid(index, FeedField::Duration, format!("{} is too large", minutes)));
    }
    match value.as_i64() {
        Some(negative) => Err(invalid(index, FeedField::Duration, format!("{} is negative", negative))),
        None => Err(wrong_type(index, FeedField::Duration, "integer")),
    }
}

fn invalid(index: usize, field: FeedField, reason: impl Into<String>) -> FieldError {
    FieldError::new(index, field, FieldErrorKind::Invalid(reason.into()))
}

fn wrong_type(index: usize, field: FeedField, expected: &'static str) -> FieldError {
    FieldError::new(index, field, FieldErrorKind::WrongType { expected })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests;
