pub mod clock;
pub mod draft;
pub mod genre;
pub mod guidance;
pub mod movie;
pub mod policy;

pub use clock::{Clock, FixedClock, SystemClock};
pub use draft::{FormField, MovieDraft, ValidationError};
pub use genre::{Genre, UnknownVariant};
pub use guidance::ParentalGuidance;
pub use movie::{is_absolute_url, release_from_date, Identity, MovieRecord, RELEASE_DATE_FORMAT, RATING_MAX, RATING_MIN};
pub use policy::ReleaseDatePolicy;
