// src/runner.rs
//! Tick loop driving the schedule engine. One-second wakeups; a triggered
//! cycle runs to completion before the loop resumes, so cycles never overlap.

use std::future::Future;

use anyhow::Result;
use tokio::time::{interval, Duration};

use crate::history::SeenStore;
use crate::pipeline::Pipeline;
use crate::schedule::{now_kst, ScheduleEngine, ScheduleSpec};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Runner {
    engine: ScheduleEngine,
    pipeline: Pipeline,
    store: SeenStore,
}

impl Runner {
    pub fn new(spec: ScheduleSpec, pipeline: Pipeline, store: SeenStore) -> Self {
        Self {
            engine: ScheduleEngine::new(spec),
            pipeline,
            store,
        }
    }

    /// Run until interrupted. Ctrl-C is the clean shutdown path: an in-flight
    /// cycle completes first, then the seen history is flushed.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = ?e, "ctrl-c listener failed, shutting down");
            }
        })
        .await
    }

    /// Run until `shutdown` resolves. The future is armed once, before the
    /// loop, so a signal that lands while a cycle is in flight is observed on
    /// the next loop turn instead of being dropped with the dead listener.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tracing::info!(
            schedule = %self.engine.spec().describe(),
            now = %now_kst().format("%Y-%m-%d %H:%M:%S %z"),
            "scheduler started (KST)"
        );

        let start = now_kst();
        if self.engine.should_run_now(start) {
            tracing::info!("running initial check");
            self.pipeline.run_cycle(&mut self.store).await;
            self.engine.mark_ran(start);
        } else {
            tracing::info!("initial check skipped, outside scheduled time");
        }

        tokio::pin!(shutdown);
        let mut ticker = interval(TICK_PERIOD);
        loop {
            tokio::select! {
                // A pending shutdown wins over starting another cycle.
                biased;

                _ = &mut shutdown => {
                    tracing::info!("interrupt received, shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let now = now_kst();
                    if self.engine.due(now) {
                        self.pipeline.run_cycle(&mut self.store).await;
                        self.engine.mark_ran(now);
                    }
                }
            }
        }

        if let Err(e) = self.store.persist() {
            tracing::warn!(error = ?e, "final history persist failed");
        }
        Ok(())
    }
}
