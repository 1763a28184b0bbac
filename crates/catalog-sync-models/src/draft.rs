use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::genre::Genre;
use crate::guidance::ParentalGuidance;
use crate::movie::{is_absolute_url, release_from_date, MovieRecord, RATING_MAX, RATING_MIN, RELEASE_DATE_FORMAT};

/// Form field a validation message belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FormField {
    Title,
    Release,
    Budget,
    Poster,
    Duration,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: FormField,
    pub message: String,
}

impl ValidationError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw user input for adding or editing a catalog entry.
///
/// Text fields hold what the user typed; `validate` turns the draft into a
/// `MovieRecord` or reports the first offending field. Unlike the feed parser,
/// an unparseable release date is always rejected here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub budget: String,
    pub duration_minutes: u32,
    pub release: String,
    pub poster: String,
    pub genre: Genre,
    pub guidance: Option<ParentalGuidance>,
    pub rating: f32,
    pub watched: bool,
}

impl MovieDraft {
    pub fn validate(&self) -> Result<MovieRecord, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::new(FormField::Title, "Movie title is mandatory!"));
        }

        let budget_str = self.budget.trim();
        if budget_str.is_empty() {
            return Err(ValidationError::new(FormField::Budget, "Movie budget is required!"));
        }
        let budget = budget_str
            .parse::<f64>()
            .map_err(|_| ValidationError::new(FormField::Budget, "Budget must be a valid number!"))?;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(ValidationError::new(FormField::Budget, "Budget must be greater than 0!"));
        }

        if self.duration_minutes == 0 {
            return Err(ValidationError::new(FormField::Duration, "Movie duration should be greater than 0!"));
        }

        let release_str = self.release.trim();
        if release_str.is_empty() {
            return Err(ValidationError::new(FormField::Release, "Release date is required!"));
        }
        let release = NaiveDate::parse_from_str(release_str, RELEASE_DATE_FORMAT)
            .map_err(|_| ValidationError::new(FormField::Release, "Date not in the correct format: yyyy-MM-dd"))?;

        let poster = self.poster.trim();
        if poster.is_empty() {
            return Err(ValidationError::new(FormField::Poster, "Poster URL is required!"));
        }
        if !is_absolute_url(poster) {
            return Err(ValidationError::new(FormField::Poster, "Poster URL has incorrect format!"));
        }

        let guidance = self
            .guidance
            .ok_or_else(|| ValidationError::new(FormField::Generic, "Please select a parental guidance rating!"))?;

        if !(RATING_MIN..=RATING_MAX).contains(&self.rating) {
            return Err(ValidationError::new(
                FormField::Generic,
                format!("Rating must be between {} and {}!", RATING_MIN, RATING_MAX),
            ));
        }

        Ok(MovieRecord {
            title: title.to_string(),
            release: release_from_date(release),
            budget: Some(budget),
            duration_minutes: self.duration_minutes,
            genre: self.genre,
            guidance: Some(guidance),
            rating: self.rating,
            watched: self.watched,
            poster_url: poster.to_string(),
        })
    }
}
