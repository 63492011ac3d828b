//! Console rendering for pipeline lifecycle events.

use forage_events::{Event, EventBus};
use tokio::task::JoinHandle;
use tracing::info;

/// Spawn a task that logs one status line per pipeline event until the bus
/// closes.
pub fn spawn_event_reporter(events: &EventBus) -> JoinHandle<()> {
    let mut stream = events.subscribe(None);
    tokio::spawn(async move {
        while let Some(envelope) = stream.next().await {
            info!(
                event = envelope.event.kind(),
                request_id = %envelope.event.request_id(),
                "{}",
                describe(&envelope.event)
            );
        }
    })
}

/// One-line human summary of a pipeline event.
#[must_use]
pub fn describe(event: &Event) -> String {
    match event {
        Event::RunStarted { source, .. } => format!("run started for {source}"),
        Event::ScanCompleted { candidates, .. } => {
            format!("scan finished with {candidates} candidate(s)")
        }
        Event::FetchProgress { url, fraction, .. } => {
            format!("fetching {url} ({:.0}%)", fraction * 100.0)
        }
        Event::AssetLoaded { key, kind, .. } => format!("loaded {kind} asset {key}"),
        Event::AssetFailed { key, reason, .. } => format!("asset {key} failed: {reason}"),
        Event::RunCompleted {
            loaded,
            skipped,
            failed,
            elapsed_ms,
            ..
        } => format!(
            "run finished in {elapsed_ms} ms ({loaded} loaded, {skipped} skipped, {failed} failed)"
        ),
        Event::CallbackFailed { reason, .. } => format!("completion callback failed: {reason}"),
    }
}
