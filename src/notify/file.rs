// src/notify/file.rs
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use super::Notifier;
use crate::config::FileFormat;
use crate::posting::MatchedPosting;

/// Writes one timestamped snapshot file per notified batch.
pub struct FileNotifier {
    output_dir: PathBuf,
    format: FileFormat,
}

#[derive(Serialize)]
struct SnapshotJob<'a> {
    title: &'a str,
    company: &'a str,
    link: &'a str,
    detail: &'a str,
    source: &'a str,
    score: f64,
    matched_keyword: &'a str,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    timestamp: String,
    count: usize,
    jobs: Vec<SnapshotJob<'a>>,
}

impl FileNotifier {
    pub fn new(output_dir: PathBuf, format: FileFormat) -> Self {
        Self { output_dir, format }
    }

    fn render_json(postings: &[MatchedPosting]) -> Result<String> {
        let snap = Snapshot {
            timestamp: chrono::Local::now().to_rfc3339(),
            count: postings.len(),
            jobs: postings
                .iter()
                .map(|m| SnapshotJob {
                    title: &m.posting.title,
                    company: &m.posting.company,
                    link: &m.posting.link,
                    detail: &m.posting.detail,
                    source: &m.posting.source,
                    score: m.score,
                    matched_keyword: &m.matched_keyword,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&snap).context("serializing snapshot")
    }

    fn render_txt(postings: &[MatchedPosting]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "New job postings found! ({} items)", postings.len());
        let _ = writeln!(
            out,
            "Generated at: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out);
        for (i, m) in postings.iter().enumerate() {
            let _ = writeln!(out, "[{}] {}", i + 1, m.posting.title);
            let _ = writeln!(out, "    Company: {}", m.posting.company);
            let _ = writeln!(out, "    Link: {}", m.posting.link);
            let _ = writeln!(out, "    Source: {}", m.posting.source);
            let _ = writeln!(out, "    Similarity: {:.2}%", m.score * 100.0);
            let _ = writeln!(out, "    Matched Keyword: {}", m.matched_keyword);
            if !m.posting.detail.is_empty() {
                let _ = writeln!(out, "    Detail: {}", m.posting.detail);
            }
            let _ = writeln!(out);
        }
        out
    }
}

#[async_trait::async_trait]
impl Notifier for FileNotifier {
    async fn send(&self, postings: &[MatchedPosting]) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let (name, body) = match self.format {
            FileFormat::Json => (
                format!("job_postings_{stamp}.json"),
                Self::render_json(postings)?,
            ),
            FileFormat::Txt => (
                format!("job_postings_{stamp}.txt"),
                Self::render_txt(postings),
            ),
        };
        let path = self.output_dir.join(name);
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "job postings saved");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Posting;

    fn batch() -> Vec<MatchedPosting> {
        vec![MatchedPosting {
            posting: Posting {
                title: "백엔드 개발자".into(),
                company: "Acme".into(),
                link: "https://jobs.example/1".into(),
                detail: "Python 서비스".into(),
                source: "example".into(),
            },
            score: 0.9,
            matched_keyword: "백엔드 개발자".into(),
        }]
    }

    #[tokio::test]
    async fn json_snapshot_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let n = FileNotifier::new(dir.path().to_path_buf(), FileFormat::Json);
        n.send(&batch()).await.unwrap();

        let entry = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let raw = std::fs::read_to_string(entry.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["jobs"][0]["title"], "백엔드 개발자");
        assert_eq!(parsed["jobs"][0]["score"], 0.9);
    }

    #[tokio::test]
    async fn txt_snapshot_lists_postings() {
        let dir = tempfile::tempdir().unwrap();
        let n = FileNotifier::new(dir.path().to_path_buf(), FileFormat::Txt);
        n.send(&batch()).await.unwrap();

        let entry = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let raw = std::fs::read_to_string(entry.path()).unwrap();
        assert!(raw.contains("[1] 백엔드 개발자"));
        assert!(raw.contains("Matched Keyword: 백엔드 개발자"));
    }
}
