use std::{collections::HashMap, sync::Arc};

use tracing::trace;

use crate::preview::Preview;

/// Lookup and insertion counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
}

impl CacheStats {
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.gets - self.hits
    }
}

/// Session-wide memo of previews, keyed by the exact final content of an
/// assistant turn.
///
/// Entries are never evicted or overwritten: once a preview is stored for a
/// content string, every later lookup observes that same preview.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<String, Arc<Preview>>,
    stats: CacheStats,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, content: &str) -> Option<Arc<Preview>> {
        self.stats.gets += 1;

        let preview = self.entries.get(content).cloned();
        if preview.is_some() {
            self.stats.hits += 1;
        }

        preview
    }

    /// Store `preview` for `content`, unless an entry already exists.
    ///
    /// Returns the preview that is cached after the call.
    pub fn put(&mut self, content: &str, preview: Preview) -> Arc<Preview> {
        self.stats.puts += 1;

        if let Some(existing) = self.entries.get(content) {
            trace!(len = content.len(), "Preview already cached.");
            return existing.clone();
        }

        let preview = Arc::new(preview);
        self.entries.insert(content.to_owned(), preview.clone());
        preview
    }

    /// Return the cached preview for `content`, computing it on a miss.
    pub fn resolve(&mut self, content: &str) -> Arc<Preview> {
        if let Some(preview) = self.get(content) {
            trace!(len = content.len(), "Preview cache hit.");
            return preview;
        }

        trace!(len = content.len(), "Preview cache miss.");
        self.put(content, Preview::from_content(content))
    }

    /// Look up `content` without touching the counters.
    #[must_use]
    pub fn peek(&self, content: &str) -> Option<Arc<Preview>> {
        self.entries.get(content).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
