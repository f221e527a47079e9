// src/posting.rs
use serde::{Deserialize, Serialize};

/// A single job posting as produced by a fetch source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub link: String,
    pub detail: String,
    pub source: String,
}

impl Posting {
    /// Cross-cycle identity. Two postings with the same source+link+title are
    /// the same entity even when `detail` differs between fetches.
    pub fn identity(&self) -> String {
        format!("{}_{}_{}", self.source, self.link, self.title)
    }
}

/// A posting that passed the keyword profile, with the matcher's verdict
/// attached. The underlying posting itself stays untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPosting {
    pub posting: Posting,
    pub score: f64,
    pub matched_keyword: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(source: &str, link: &str, title: &str) -> Posting {
        Posting {
            title: title.into(),
            company: "Acme".into(),
            link: link.into(),
            detail: "details".into(),
            source: source.into(),
        }
    }

    #[test]
    fn identity_ignores_detail() {
        let mut a = posting("saramin", "https://x/1", "Backend Developer");
        let b = posting("saramin", "https://x/1", "Backend Developer");
        a.detail = "updated description".into();
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_distinguishes_source_link_title() {
        let a = posting("saramin", "https://x/1", "Backend Developer");
        assert_ne!(
            a.identity(),
            posting("wanted", "https://x/1", "Backend Developer").identity()
        );
        assert_ne!(
            a.identity(),
            posting("saramin", "https://x/2", "Backend Developer").identity()
        );
        assert_ne!(
            a.identity(),
            posting("saramin", "https://x/1", "Frontend Developer").identity()
        );
    }
}
