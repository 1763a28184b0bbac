use super::AppContext;
use crate::output::Output;
use catalog_sync_core::{SyncOrchestrator, SyncOutcome, SyncPublisher, SyncState};
use color_eyre::Result;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Triggers a sync cycle every `interval` and logs each outcome
pub struct Scheduler {
    orchestrator: SyncOrchestrator,
    outcomes: UnboundedReceiver<SyncOutcome>,
    interval: Duration,
    run_on_startup: bool,
}

impl Scheduler {
    pub fn new(
        orchestrator: SyncOrchestrator,
        outcomes: UnboundedReceiver<SyncOutcome>,
        interval: Duration,
        run_on_startup: bool,
    ) -> Self {
        Self {
            orchestrator,
            outcomes,
            interval,
            run_on_startup,
        }
    }

    /// Run until Ctrl-C, then wait for a cycle that is still in flight
    pub async fn start(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.run_on_startup {
            // The first tick completes immediately
            ticker.tick().await;
        }

        info!(
            operation = "scheduler_started",
            interval_secs = self.interval.as_secs(),
            run_on_startup = self.run_on_startup,
            feed = %self.orchestrator.feed_url(),
            "Scheduler started"
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let orchestrator = &self.orchestrator;
        let outcomes = &mut self.outcomes;
        loop {
            tokio::select! {
                _ = ticker.tick() => trigger(orchestrator),
                Some(outcome) = outcomes.recv() => log_outcome(&outcome),
                signal = &mut shutdown => {
                    if let Err(e) = signal {
                        error!(operation = "scheduler", error = %e, "Failed to listen for shutdown signal");
                    }
                    break;
                }
            }
        }

        info!(operation = "scheduler_stopping", "Shutdown requested");
        if self.orchestrator.state() != SyncState::Idle {
            info!(operation = "scheduler_stopping", "Waiting for the running sync to finish");
            if let Some(outcome) = self.outcomes.recv().await {
                log_outcome(&outcome);
            }
        }
        info!(
            operation = "scheduler_stopped",
            completed_cycles = self.orchestrator.completed_cycles(),
            "Scheduler stopped"
        );
        Ok(())
    }
}

fn trigger(orchestrator: &SyncOrchestrator) {
    match orchestrator.run_sync_cycle() {
        Ok(handle) => {
            info!(operation = "scheduled_sync_start", cycle = handle.cycle, "Starting scheduled sync");
        }
        Err(e) => {
            warn!(operation = "scheduled_sync_skipped", error = %e, "Skipping scheduled sync");
        }
    }
}

fn log_outcome(outcome: &SyncOutcome) {
    let summary = outcome.summary();
    match &outcome.result {
        Ok(report) => {
            info!(
                operation = "scheduled_sync_complete",
                cycle = summary.cycle,
                merged = summary.merged,
                inserted = report.inserted,
                replaced = report.replaced,
                rejected = report.field_errors.len(),
                duration_ms = summary.duration_ms,
                "Scheduled sync completed successfully"
            );
        }
        Err(failure) => {
            error!(
                operation = "scheduled_sync_error",
                cycle = summary.cycle,
                error = %failure,
                "Scheduled sync failed"
            );
        }
    }
}

/// Resolve interval and startup behavior from flags over configuration
fn schedule_settings(ctx: &AppContext, interval_override: Option<u64>, no_startup_sync: bool) -> Result<(Duration, bool)> {
    let interval_secs = interval_override.unwrap_or(ctx.config.scheduler.refresh_interval_secs);
    if interval_secs == 0 {
        return Err(color_eyre::eyre::eyre!("Sync interval must be greater than 0 seconds"));
    }
    let run_on_startup = !no_startup_sync && ctx.config.scheduler.run_on_startup;
    Ok((Duration::from_secs(interval_secs), run_on_startup))
}

pub async fn run_daemon(
    ctx: &AppContext,
    interval_override: Option<u64>,
    no_startup_sync: bool,
    output: &Output,
) -> Result<()> {
    let (interval, run_on_startup) = schedule_settings(ctx, interval_override, no_startup_sync)?;

    let store = ctx.open_store().await?;
    let (publisher, outcomes) = SyncPublisher::channel();
    let orchestrator = ctx.orchestrator(store, publisher)?;

    output.info(format!(
        "Syncing {} every {}s. Logs: {}. Press Ctrl-C to stop.",
        orchestrator.feed_url(),
        interval.as_secs(),
        ctx.daemon_log_file().display()
    ));

    let mut scheduler = Scheduler::new(orchestrator, outcomes, interval, run_on_startup);
    scheduler
        .start()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Scheduler failed: {}", e))?;

    output.success("Daemon stopped");
    Ok(())
}
