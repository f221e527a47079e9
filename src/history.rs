// src/history.rs
//! Flat-file store of previously seen posting identities. Loaded once at
//! startup, mutated by the pipeline, overwritten wholesale on persist.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::posting::MatchedPosting;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    seen_ids: Vec<String>,
}

#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl SeenStore {
    /// Load persisted history. A missing file is simply an empty history;
    /// any read or parse failure is logged and treated the same way, never
    /// as a startup error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HistoryFile>(&raw) {
                Ok(file) => file.seen_ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable history, starting empty");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read history, starting empty");
                HashSet::new()
            }
        };
        Self { path, seen }
    }

    /// Keep only postings not seen before. Each kept identity is registered
    /// in the same pass, so a duplicate inside one batch is kept once.
    pub fn filter_new(&mut self, postings: Vec<MatchedPosting>) -> Vec<MatchedPosting> {
        postings
            .into_iter()
            .filter(|p| self.seen.insert(p.posting.identity()))
            .collect()
    }

    /// Overwrite the persisted record with the full current identity set.
    pub fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating history dir {}", dir.display()))?;
            }
        }
        let file = HistoryFile {
            seen_ids: self.seen.iter().cloned().collect(),
        };
        let body = serde_json::to_string_pretty(&file).context("serializing history")?;
        fs::write(&self.path, body)
            .with_context(|| format!("writing history {}", self.path.display()))
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Posting;

    fn matched(source: &str, link: &str, title: &str) -> MatchedPosting {
        MatchedPosting {
            posting: Posting {
                title: title.into(),
                company: "Acme".into(),
                link: link.into(),
                detail: String::new(),
                source: source.into(),
            },
            score: 1.0,
            matched_keyword: "python".into(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::load(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json at all").unwrap();
        let store = SeenStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn filter_new_registers_and_dedups_within_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeenStore::load(dir.path().join("history.json"));
        let batch = vec![
            matched("s", "https://x/1", "a"),
            matched("s", "https://x/1", "a"), // same identity, same batch
            matched("s", "https://x/2", "b"),
        ];
        let fresh = store.filter_new(batch);
        assert_eq!(fresh.len(), 2);
        assert_eq!(store.len(), 2);

        // A later batch with known identities yields nothing.
        let again = store.filter_new(vec![matched("s", "https://x/2", "b")]);
        assert!(again.is_empty());
    }

    #[test]
    fn persist_roundtrips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/history.json");

        let mut store = SeenStore::load(&path);
        let fresh = store.filter_new(vec![matched("s", "https://x/1", "t")]);
        assert_eq!(fresh.len(), 1);
        store.persist().unwrap();

        // Next process run: the same posting is no longer new.
        let mut reloaded = SeenStore::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains("s_https://x/1_t"));
        let again = reloaded.filter_new(vec![matched("s", "https://x/1", "t")]);
        assert!(again.is_empty());
    }
}
