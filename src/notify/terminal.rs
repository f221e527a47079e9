// src/notify/terminal.rs
use anyhow::Result;

use super::Notifier;
use crate::posting::MatchedPosting;

const RULE: &str = "================================================================================";

pub struct TerminalNotifier;

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[async_trait::async_trait]
impl Notifier for TerminalNotifier {
    async fn send(&self, postings: &[MatchedPosting]) -> Result<()> {
        println!("\n{RULE}");
        println!("New job postings found! ({} items)", postings.len());
        println!("{RULE}");
        for (i, m) in postings.iter().enumerate() {
            println!("\n[{}] {}", i + 1, m.posting.title);
            println!("    Company: {}", m.posting.company);
            println!("    Link: {}", m.posting.link);
            println!("    Source: {}", m.posting.source);
            println!("    Similarity: {:.2}%", m.score * 100.0);
            println!("    Matched Keyword: {}", m.matched_keyword);
            if !m.posting.detail.is_empty() {
                println!("    Detail: {}", truncate_chars(&m.posting.detail, 100));
            }
        }
        println!("\n{RULE}\n");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("short", 100), "short");
        let long = "백엔드".repeat(50);
        let cut = truncate_chars(&long, 100);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 103);
    }
}
