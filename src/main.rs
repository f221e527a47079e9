//! Recruit Radar — binary entrypoint.
//! Loads configuration, wires matcher, sources, history, and notifiers, then
//! hands control to the tick loop.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recruit_radar::config::Config;
use recruit_radar::fetch::rss::RssSource;
use recruit_radar::fetch::FetchSource;
use recruit_radar::history::SeenStore;
use recruit_radar::matcher::{KeywordProfile, Matcher};
use recruit_radar::notify::NotifierMux;
use recruit_radar::pipeline::Pipeline;
use recruit_radar::runner::Runner;
use recruit_radar::schedule::ScheduleSpec;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent. Carries SMTP credentials and
    // RECRUIT_CONFIG_PATH.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load_default().context("loading configuration")?;

    // Malformed schedule strings abort here, before any cycle runs.
    let spec = ScheduleSpec::from_config(&cfg.schedule).context("invalid schedule configuration")?;

    let profile = KeywordProfile::new(
        cfg.include_keywords.clone(),
        cfg.exclude_keywords.clone(),
        cfg.similarity_threshold,
    );
    let matcher = Matcher::new(profile);

    let sources: Vec<Box<dyn FetchSource>> = cfg
        .sources
        .iter()
        .map(|s| Box::new(RssSource::new(s.name.clone(), s.feed_url.clone())) as Box<dyn FetchSource>)
        .collect();

    let notifier = NotifierMux::from_config(&cfg.notifications);
    let store = SeenStore::load(&cfg.history_path);

    tracing::info!(
        sources = sources.len(),
        keywords = cfg.include_keywords.len(),
        seen = store.len(),
        channels = notifier.channel_count(),
        "recruit radar starting"
    );

    let pipeline = Pipeline::new(sources, matcher, notifier);
    Runner::new(spec, pipeline, store).run().await
}
