pub mod client;

pub use client::HttpFeedClient;
