// src/notify/mod.rs
pub mod email;
pub mod file;
pub mod terminal;

use anyhow::Result;

use crate::config::NotificationsConfig;
use crate::posting::MatchedPosting;

/// A delivery channel. `send` may fail; failures never reach the pipeline.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, postings: &[MatchedPosting]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans one batch out to every configured channel, swallowing per-channel
/// failures. Toward the pipeline this is strictly fire-and-forget.
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Build channels from config. The email channel reads SMTP settings from
    /// the environment; incomplete settings disable it with a warning rather
    /// than failing startup.
    pub fn from_config(cfg: &NotificationsConfig) -> Self {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
        if cfg.terminal {
            channels.push(Box::new(terminal::TerminalNotifier));
        }
        if cfg.file.enabled {
            channels.push(Box::new(file::FileNotifier::new(
                cfg.file.output_dir.clone(),
                cfg.file.format,
            )));
        }
        if cfg.email.enabled {
            match email::EmailNotifier::from_env() {
                Ok(n) => channels.push(Box::new(n)),
                Err(e) => {
                    tracing::warn!(error = %e, "email notifications disabled");
                }
            }
        }
        Self { channels }
    }

    pub async fn notify(&self, postings: &[MatchedPosting]) {
        if postings.is_empty() {
            return;
        }
        for ch in &self.channels {
            if let Err(e) = ch.send(postings).await {
                tracing::warn!(channel = ch.name(), error = ?e, "notification failed");
            }
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
