// src/fetch/mod.rs
pub mod rss;

use anyhow::Result;

use crate::posting::Posting;

/// External fetch collaborator: one call per (source, keyword) pair.
///
/// Implementations own their timeouts and retries and must not carry
/// cross-call state the pipeline depends on. An empty vector means zero
/// results, not failure.
#[async_trait::async_trait]
pub trait FetchSource: Send + Sync {
    async fn fetch(&self, keyword: &str) -> Result<Vec<Posting>>;
    fn name(&self) -> &str;
}
