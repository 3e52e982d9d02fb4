use std::collections::HashSet;

/// Per-call state of a breadth-first traversal
pub struct CrawlState {
    /// Titles fetched or scheduled, to prevent cycles
    visited: HashSet<String>,
    /// Canonical titles of documents already collected
    collected: HashSet<String>,
    /// Titles to fetch at the next level, in insertion order
    frontier: Vec<String>,
}

impl CrawlState {
    pub fn new(root: &str) -> Self {
        Self {
            visited: HashSet::from([root.to_string()]),
            collected: HashSet::new(),
            frontier: vec![root.to_string()],
        }
    }

    /// Queue `title` for the next level unless it was seen before.
    /// Returns whether it was queued.
    pub fn schedule(&mut self, title: &str) -> bool {
        if self.visited.contains(title) {
            return false;
        }
        self.visited.insert(title.to_string());
        self.frontier.push(title.to_string());
        true
    }

    /// Record a fetched document under its canonical title.
    /// Returns false if a document with that title was already collected.
    pub fn mark_collected(&mut self, title: &str) -> bool {
        self.visited.insert(title.to_string());
        self.collected.insert(title.to_string())
    }

    /// Hands out the pending level and starts an empty one
    pub fn take_frontier(&mut self) -> Vec<String> {
        std::mem::take(&mut self.frontier)
    }

    pub fn has_frontier(&self) -> bool {
        !self.frontier.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
