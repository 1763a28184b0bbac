pub mod config;
pub mod paths;

pub use config::{Config, FeedConfig, LoggingConfig, ReleaseDatePolicy, SchedulerConfig, StoreConfig, DEFAULT_FEED_URL};
pub use paths::{PathManager, container_base_path};
