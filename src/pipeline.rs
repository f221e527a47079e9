// src/pipeline.rs
//! One monitoring cycle: fetch per (source, keyword), dedup by link, keyword
//! match, drop already-seen, notify. Runs to completion inside a single tick.

use std::collections::HashSet;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::fetch::FetchSource;
use crate::history::SeenStore;
use crate::matcher::Matcher;
use crate::notify::NotifierMux;
use crate::posting::{MatchedPosting, Posting};

/// Fixed pause between consecutive fetch calls. This politeness throttle is
/// the only backpressure applied toward external sources.
pub const FETCH_DELAY: Duration = Duration::from_secs(1);

/// One-time metrics registration (names stay stable across cycles).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("cycle_runs_total", "Completed monitoring cycles.");
        describe_counter!("fetch_errors_total", "Failed (source, keyword) fetch calls.");
        describe_counter!("fetch_postings_total", "Raw postings returned by sources.");
        describe_counter!(
            "postings_notified_total",
            "New matching postings handed to notifiers."
        );
        describe_gauge!("cycle_last_run_ts", "Unix ts of the last completed cycle.");
    });
}

/// First occurrence per link wins. Postings without a link are all kept and
/// never deduplicated against each other.
pub fn dedup_by_link(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    postings
        .into_iter()
        .filter(|p| p.link.is_empty() || seen.insert(p.link.clone()))
        .collect()
}

pub struct Pipeline {
    sources: Vec<Box<dyn FetchSource>>,
    matcher: Matcher,
    notifier: NotifierMux,
    fetch_delay: Duration,
}

impl Pipeline {
    pub fn new(sources: Vec<Box<dyn FetchSource>>, matcher: Matcher, notifier: NotifierMux) -> Self {
        Self {
            sources,
            matcher,
            notifier,
            fetch_delay: FETCH_DELAY,
        }
    }

    /// Tests run with a zero delay.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Pool raw postings across every (source, keyword) pair, serially. A
    /// failing pair is logged and skipped; it never suppresses results from
    /// any other pair in the same cycle.
    async fn collect(&self) -> Vec<Posting> {
        let keywords = self.matcher.profile().include_keywords();
        let pairs = self.sources.len() * keywords.len();
        let mut pool = Vec::new();
        let mut done = 0;
        for source in &self.sources {
            for keyword in keywords {
                done += 1;
                match source.fetch(keyword).await {
                    Ok(mut postings) => {
                        tracing::debug!(
                            source = source.name(),
                            keyword = %keyword,
                            count = postings.len(),
                            "fetched"
                        );
                        pool.append(&mut postings);
                        // Pause between calls only; the last pair and failed
                        // calls add no tail to the cycle.
                        if done < pairs {
                            tokio::time::sleep(self.fetch_delay).await;
                        }
                    }
                    Err(e) => {
                        counter!("fetch_errors_total").increment(1);
                        tracing::warn!(source = source.name(), keyword = %keyword, error = ?e, "fetch failed");
                    }
                }
            }
        }
        pool
    }

    /// Run one full cycle against `store`. Returns the postings handed to the
    /// notifiers (empty batches skip notification entirely).
    pub async fn run_cycle(&self, store: &mut SeenStore) -> Vec<MatchedPosting> {
        ensure_metrics_described();
        tracing::info!("checking for new job postings");

        let raw = self.collect().await;
        let unique = dedup_by_link(raw);
        let matched = self.matcher.filter_matching(unique);
        let fresh = store.filter_new(matched);

        if fresh.is_empty() {
            tracing::info!("no new matching postings");
        } else {
            // Persist only on cycles that actually added identities.
            if let Err(e) = store.persist() {
                tracing::warn!(error = ?e, "history persist failed, continuing in memory");
            }
            tracing::info!(count = fresh.len(), "new matching postings");
            counter!("postings_notified_total").increment(fresh.len() as u64);
            self.notifier.notify(&fresh).await;
        }

        counter!("cycle_runs_total").increment(1);
        gauge!("cycle_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(link: &str, title: &str) -> Posting {
        Posting {
            title: title.into(),
            company: String::new(),
            link: link.into(),
            detail: String::new(),
            source: "s".into(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup_by_link(vec![
            posting("https://x/1", "first"),
            posting("https://x/2", "other"),
            posting("https://x/1", "second copy"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "first");
        assert_eq!(out[1].title, "other");
    }

    #[test]
    fn empty_links_are_never_deduplicated() {
        let out = dedup_by_link(vec![
            posting("", "a"),
            posting("", "b"),
            posting("https://x/1", "c"),
        ]);
        assert_eq!(out.len(), 3);
    }
}
