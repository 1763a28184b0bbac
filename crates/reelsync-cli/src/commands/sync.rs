use super::sync_ui::SyncUI;
use super::AppContext;
use crate::output::Output;
use catalog_sync_core::SyncPublisher;
use color_eyre::Result;
use std::time::Duration;

pub async fn run_sync(ctx: &AppContext, output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let store = ctx.open_store().await?;
    let (publisher, mut outcomes) = SyncPublisher::channel();
    let orchestrator = ctx.orchestrator(store, publisher)?;

    let handle = orchestrator
        .run_sync_cycle()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start sync: {}", e))?;

    let mut ui = SyncUI::new(output.wants_progress());
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let outcome = loop {
        tokio::select! {
            outcome = outcomes.recv() => break outcome,
            _ = ticker.tick() => ui.show_state(orchestrator.state()),
        }
    };
    ui.finish();

    handle
        .wait()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Sync task failed: {}", e))?;

    let outcome = outcome.ok_or_else(|| color_eyre::eyre::eyre!("Sync finished without reporting a result"))?;
    let feed_url = orchestrator.feed_url().as_str();
    match &outcome.result {
        Ok(report) => {
            output.sync_report(outcome.cycle, feed_url, report);
            Ok(())
        }
        Err(failure) => {
            output.sync_failure(outcome.cycle, feed_url, failure);
            Err(color_eyre::eyre::eyre!("Sync failed: {}", failure))
        }
    }
}

