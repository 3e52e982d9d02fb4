use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// A fetched article: its canonical title, plain text and outbound links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub identifier: String,
    pub text: String,
    pub links: BTreeSet<String>,
}

/// Result of asking a source for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(Document),
    /// The identifier does not name an existing document
    NotFound,
}

/// Anything the crawler can pull documents from.
///
/// `Err` means the source itself failed (network, bad response) and aborts
/// the traversal; a missing document is `Ok(FetchOutcome::NotFound)`.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<FetchOutcome>;
}
