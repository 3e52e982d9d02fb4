use std::sync::Arc;
use futures::stream::{self, StreamExt, TryStreamExt};
use log2::{debug, info, warn};

use super::config::CrawlerConfigRef;
use super::error::CrawlError;
use super::source::{Document, DocumentSource, FetchOutcome};
use super::state::CrawlState;

/// Breadth-first, depth-bounded collector of documents
pub struct Crawler {
    source: Arc<dyn DocumentSource>,
    config: CrawlerConfigRef,
}

impl Crawler {
    pub fn new(source: Arc<dyn DocumentSource>, config: CrawlerConfigRef) -> Self {
        Self { source, config }
    }

    /// Texts of every distinct document within `depth` hops of `root`.
    pub async fn collect_document_texts(&self, root: &str, depth: usize) -> Result<Vec<String>, CrawlError> {
        let documents = self.collect_documents(root, depth).await?;
        Ok(documents.into_iter().map(|document| document.text).collect())
    }

    /// Visits `root` and everything reachable from it within `depth` hops,
    /// fetching each title at most once.
    ///
    /// Documents come back in fetch order: level by level, each level in the
    /// order its titles were first discovered.
    pub async fn collect_documents(&self, root: &str, depth: usize) -> Result<Vec<Document>, CrawlError> {
        if let Some(max) = self.config.max_depth {
            if depth > max {
                return Err(CrawlError::DepthExceeded { requested: depth, max });
            }
        }

        let mut state = CrawlState::new(root);
        let mut documents = Vec::new();
        let mut current_depth = 0;

        while current_depth <= depth && state.has_frontier() {
            let frontier = state.take_frontier();
            info!("Fetching {} documents at depth {}", frontier.len(), current_depth);

            let outcomes = self.fetch_level(&frontier).await?;

            for (title, outcome) in frontier.iter().zip(outcomes) {
                match outcome {
                    FetchOutcome::NotFound if current_depth == 0 => {
                        return Err(CrawlError::RootNotFound(title.clone()));
                    }
                    FetchOutcome::NotFound => {
                        warn!("The article '{}' does not exist, skipping", title);
                    }
                    FetchOutcome::Found(document) => {
                        if !state.mark_collected(&document.identifier) {
                            debug!("'{}' resolved to already collected '{}'", title, document.identifier);
                            continue;
                        }
                        if current_depth < depth {
                            let scheduled = document.links.iter().filter(|link| state.schedule(link)).count();
                            debug!("'{}' scheduled {} of {} links", document.identifier, scheduled, document.links.len());
                        }
                        documents.push(document);
                    }
                }
            }

            current_depth += 1;
        }

        info!("Collected {} documents from '{}' ({} titles seen)", documents.len(), root, state.visited_count());
        Ok(documents)
    }

    /// Fetches one level with bounded concurrency, keeping frontier order.
    async fn fetch_level(&self, frontier: &[String]) -> Result<Vec<FetchOutcome>, CrawlError> {
        let outcomes = stream::iter(frontier.iter().cloned())
            .map(|title| {
                let source = Arc::clone(&self.source);
                async move { source.fetch(&title).await }
            })
            .buffered(self.config.concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await?;
        Ok(outcomes)
    }
}
