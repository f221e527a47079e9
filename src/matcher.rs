// src/matcher.rs
//! Keyword-profile matcher: bilingual (Latin/Hangul) similarity scoring and
//! ranked filtering of postings.

use std::collections::HashSet;

use crate::posting::{MatchedPosting, Posting};

/// Desired-role profile the matcher scores against. Built once from
/// configuration; keywords are held lowercased for the process lifetime.
#[derive(Debug, Clone)]
pub struct KeywordProfile {
    include: Vec<String>,
    exclude: Vec<String>,
    threshold: f64,
}

impl KeywordProfile {
    pub fn new(include: Vec<String>, exclude: Vec<String>, threshold: f64) -> Self {
        Self {
            include: include.into_iter().map(|k| k.to_lowercase()).collect(),
            exclude: exclude.into_iter().map(|k| k.to_lowercase()).collect(),
            threshold,
        }
    }

    pub fn include_keywords(&self) -> &[String] {
        &self.include
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Outcome of scoring one posting against a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchVerdict {
    pub matched: bool,
    pub score: f64,
    pub keyword: String,
}

fn has_hangul(s: &str) -> bool {
    // Hangul syllables block; enough to flag a Korean keyword.
    s.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| *c != ' ').collect()
}

/// Edit similarity in [0, 1]: `2·LCS(a, b) / (|a| + |b|)` over characters.
fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
        cur[0] = 0;
    }
    let lcs = prev[b.len()];
    (2.0 * lcs as f64) / ((a.len() + b.len()) as f64)
}

/// Similarity of `keyword` against `text`, in [0, 1] (case-insensitive).
///
/// Exact substring containment short-circuits to 1.0. Hangul keywords get
/// spacing-aware handling before the edit-similarity fallback: Korean job
/// titles are written both spaced ("백엔드 개발자") and fused ("백엔드개발자"),
/// and the two must score as near-equal.
pub fn similarity(text: &str, keyword: &str) -> f64 {
    let text_l = text.to_lowercase();
    let kw_l = keyword.to_lowercase();

    if text_l.contains(&kw_l) {
        return 1.0;
    }

    let kw_is_hangul = has_hangul(&kw_l);

    if kw_is_hangul {
        let kw_tokens: Vec<&str> = kw_l.split_whitespace().collect();
        if !kw_tokens.is_empty() {
            let text_tokens: HashSet<&str> = text_l.split_whitespace().collect();
            let kw_set: HashSet<&str> = kw_tokens.iter().copied().collect();
            let common = kw_set.iter().filter(|t| text_tokens.contains(*t)).count();

            // Every keyword token present verbatim.
            if common == kw_set.len() {
                return 1.0;
            }

            // Spacing-convention mismatch: compare with spaces stripped.
            let text_ns = strip_spaces(&text_l);
            let kw_ns = strip_spaces(&kw_l);
            if text_ns.contains(&kw_ns) {
                return 0.9;
            }

            // All tokens findable somewhere, spaced or fused.
            let found = kw_tokens
                .iter()
                .filter(|t| text_l.contains(*t) || text_ns.contains(*t))
                .count();
            if found == kw_tokens.len() {
                let overlap = common as f64 / kw_set.len() as f64;
                return overlap.max(0.7);
            }
        }
    }

    let mut score = lcs_ratio(&text_l, &kw_l);

    let kw_words: HashSet<&str> = kw_l.split_whitespace().collect();
    if !kw_words.is_empty() {
        let text_words: HashSet<&str> = text_l.split_whitespace().collect();
        let overlap =
            kw_words.iter().filter(|w| text_words.contains(*w)).count() as f64 / kw_words.len() as f64;
        score = score.max(overlap * 0.8);
    }

    // Unrelated Hangul phrases often share trailing syllables ("...개발자"),
    // which inflates edit similarity. With no keyword token present at all,
    // dampen hard.
    if kw_is_hangul && score < 0.6 {
        let any_found = kw_l.split_whitespace().any(|t| text_l.contains(t));
        if !any_found {
            score *= 0.3;
        }
    }

    score
}

#[derive(Debug, Clone)]
pub struct Matcher {
    profile: KeywordProfile,
}

impl Matcher {
    pub fn new(profile: KeywordProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &KeywordProfile {
        &self.profile
    }

    /// Score one posting against the profile. Exclusion is absolute: any
    /// exclude keyword in title+detail bypasses scoring entirely.
    pub fn evaluate(&self, posting: &Posting) -> MatchVerdict {
        let full = format!("{} {}", posting.title, posting.detail).to_lowercase();
        if self.profile.exclude.iter().any(|kw| full.contains(kw.as_str())) {
            return MatchVerdict {
                matched: false,
                score: 0.0,
                keyword: String::new(),
            };
        }

        let mut best = 0.0_f64;
        let mut best_kw = String::new();
        for kw in &self.profile.include {
            let title_score = similarity(&posting.title, kw);
            let detail_score = similarity(&posting.detail, kw);
            // Title hits carry 1.5x weight and the combined value is not
            // clamped, so an exact title match (1.5) outranks any detail hit.
            // The threshold compares against this unclamped value.
            let combined = (title_score * 1.5).max(detail_score);
            if combined > best {
                best = combined;
                best_kw = kw.clone();
            }
        }

        MatchVerdict {
            matched: best >= self.profile.threshold,
            score: best,
            keyword: best_kw,
        }
    }

    /// Keep matching postings with their verdicts attached, ranked by
    /// descending score. `sort_by` is stable: equal scores keep fetch order.
    pub fn filter_matching(&self, postings: Vec<Posting>) -> Vec<MatchedPosting> {
        let total = postings.len();
        let mut matched: Vec<MatchedPosting> = postings
            .into_iter()
            .filter_map(|posting| {
                let v = self.evaluate(&posting);
                v.matched.then(|| MatchedPosting {
                    posting,
                    score: v.score,
                    matched_keyword: v.keyword,
                })
            })
            .collect();
        matched.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        tracing::info!(matched = matched.len(), total, "keyword filter");
        matched
    }
}
