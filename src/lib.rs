// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod fetch;
pub mod history;
pub mod matcher;
pub mod notify;
pub mod pipeline;
pub mod posting;
pub mod runner;
pub mod schedule;

// ---- Re-exports for stable public API ----
pub use crate::fetch::FetchSource;
pub use crate::history::SeenStore;
pub use crate::matcher::{similarity, KeywordProfile, Matcher};
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::pipeline::Pipeline;
pub use crate::posting::{MatchedPosting, Posting};
pub use crate::schedule::{ScheduleEngine, ScheduleSpec};
