pub mod error;
pub mod http;
pub mod parser;
pub mod traits;

pub use error::{BatchParseError, FeedField, FieldError, FieldErrorKind, TransportError};
pub use http::HttpFeedClient;
pub use parser::{DateLeniencyEvent, FeedEntries, FeedParser, ParsedFeed, ParsedMovie};
pub use traits::FeedClient;
