use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("The article '{0}' does not exist on Wikipedia")]
    RootNotFound(String),

    #[error("Requested depth {requested} exceeds the maximum of {max}")]
    DepthExceeded { requested: usize, max: usize },

    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}
