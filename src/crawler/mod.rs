pub mod state;
pub mod config;
pub mod error;
pub mod source;
pub mod runner;
pub mod wikipedia;


pub use state::CrawlState;
pub use config::{CrawlerConfig, CrawlerConfigRef, REQUEST_TIMEOUT_SEC};
pub use error::CrawlError;
pub use source::{Document, DocumentSource, FetchOutcome};
pub use runner::Crawler;
pub use wikipedia::{WikipediaSource, DEFAULT_API_URL, DEFAULT_USER_AGENT};
