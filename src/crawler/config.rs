use std::sync::Arc;

/// Default timeout for content source requests in seconds
pub const REQUEST_TIMEOUT_SEC: u64 = 10;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight within one depth level
    pub concurrency: usize,
    /// Largest depth a caller may ask for, unlimited when `None`
    pub max_depth: Option<usize>,
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self {
            concurrency: 4,
            max_depth: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub type CrawlerConfigRef = Arc<CrawlerConfig>;
