//! Sequential load service.
//!
//! A single worker task drains a FIFO request queue. For each request it
//! scans (or takes) the candidate list, then fetches, caches, and decodes
//! every candidate in order, accumulating results into an
//! [`AssetCollection`] that is handed to the request's completion callback.
//! Per-asset failures are recoverable; a failing asset is logged, surfaced
//! as an `asset_failed` event, and dropped from the collection.

use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use forage_core::{
    AssetCollection, AssetDescriptor, AssetKind, LoadRequest, LoadSource, LoadStatus, RunReport,
};
use forage_events::{Event, EventBus};
use forage_fetch::{AssetFetcher, FetchSource, FetchedPayload};
use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audio;
use crate::cache;
use crate::classify::{classify_path, extension_of, scan_folder};
use crate::decode::decode_image;
use crate::error::PipelineError;

/// Minimum fraction advance between consecutive `fetch_progress` events.
///
/// The observer always announces the first report and the transition to
/// completion, so short fetches still produce at least one event.
pub const PROGRESS_EVENT_STEP: f64 = 0.05;

/// Loader construction options.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Folder receiving cached copies of remote payloads.
    pub cache_dir: PathBuf,
}

/// Cloneable handle to a spawned loader worker.
///
/// Dropping every handle closes the queue and lets the worker exit once the
/// backlog drains.
#[derive(Debug, Clone)]
pub struct LoaderHandle {
    sender: mpsc::UnboundedSender<(Uuid, LoadRequest)>,
    busy: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
    status: Arc<Mutex<LoadStatus>>,
}

impl LoaderHandle {
    /// Append a request to the queue and return its run identifier.
    ///
    /// Requests are served strictly in enqueue order, one at a time. If the
    /// worker has already exited the request is dropped and an error is
    /// logged; the returned identifier then never appears on the bus.
    #[must_use]
    pub fn enqueue(&self, request: LoadRequest) -> Uuid {
        let request_id = Uuid::new_v4();
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send((request_id, request)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            error!(%request_id, "loader worker is gone, request dropped");
        }
        request_id
    }

    /// Enqueue a run for `source` and wait for its collection inline.
    ///
    /// Convenience over [`enqueue`](Self::enqueue) for callers that prefer
    /// an awaitable result to a callback. Returns `None` once the worker
    /// has shut down without delivering the run's collection.
    pub async fn load(&self, source: LoadSource, show_progress: bool) -> Option<AssetCollection> {
        let (respond_to, collection) = oneshot::channel();
        let request = LoadRequest {
            source,
            show_progress,
            on_completed: Box::new(move |result| {
                let _ = respond_to.send(result);
            }),
        };
        let request_id = self.enqueue(request);
        debug!(%request_id, "waiting for inline load to complete");
        collection.await.ok()
    }

    /// Whether a run is executing right now.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Number of requests enqueued but not yet dequeued by the worker.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the loader's observable state.
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// The loader worker. Constructed and spawned via [`AssetLoader::spawn`].
pub struct AssetLoader {
    config: LoaderConfig,
    fetcher: Arc<dyn AssetFetcher>,
    events: EventBus,
    busy: Arc<AtomicBool>,
    status: Arc<Mutex<LoadStatus>>,
    fetch_slot: Mutex<Option<AbortHandle>>,
}

impl AssetLoader {
    /// Spawn the worker task and return a handle for enqueueing requests.
    #[must_use]
    pub fn spawn(
        config: LoaderConfig,
        fetcher: Arc<dyn AssetFetcher>,
        events: EventBus,
    ) -> LoaderHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let busy = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(AtomicUsize::new(0));
        let status = Arc::new(Mutex::new(LoadStatus::default()));

        let loader = Self {
            config,
            fetcher,
            events,
            busy: Arc::clone(&busy),
            status: Arc::clone(&status),
            fetch_slot: Mutex::new(None),
        };
        tokio::spawn(loader.run(receiver, Arc::clone(&pending)));

        LoaderHandle {
            sender,
            busy,
            pending,
            status,
        }
    }

    async fn run(
        self,
        mut receiver: mpsc::UnboundedReceiver<(Uuid, LoadRequest)>,
        pending: Arc<AtomicUsize>,
    ) {
        while let Some((request_id, request)) = receiver.recv().await {
            pending.fetch_sub(1, Ordering::SeqCst);
            self.busy.store(true, Ordering::SeqCst);
            self.with_status(|status| {
                *status = LoadStatus {
                    busy: true,
                    ..LoadStatus::default()
                };
            });

            // A panicking run must not take the worker down with it.
            let outcome = AssertUnwindSafe(self.process(request_id, request))
                .catch_unwind()
                .await;
            if let Err(payload) = outcome {
                error!(
                    %request_id,
                    reason = %panic_message(payload.as_ref()),
                    "load run panicked"
                );
            }

            self.abort_stale_fetch();
            self.busy.store(false, Ordering::SeqCst);
            self.with_status(|status| {
                status.busy = false;
                status.current_url = None;
                status.progress = 0.0;
            });
        }
        debug!("loader queue closed, worker exiting");
    }

    async fn process(&self, request_id: Uuid, request: LoadRequest) {
        let LoadRequest {
            source,
            show_progress,
            on_completed,
        } = request;

        let started = Instant::now();
        let source_label = source.to_string();
        info!(%request_id, source = %source_label, "load run started");
        let _ = self.events.publish(Event::RunStarted {
            request_id,
            source: source_label,
        });

        let candidates = match source {
            LoadSource::Folder(path) => scan_folder(Path::new(&path)),
            LoadSource::Descriptors(list) => list,
        };
        let _ = self.events.publish(Event::ScanCompleted {
            request_id,
            candidates: candidates.len(),
        });

        let mut collection = AssetCollection::new();
        let mut report = RunReport::default();
        for descriptor in candidates {
            self.process_asset(
                request_id,
                descriptor,
                show_progress,
                &mut collection,
                &mut report,
            )
            .await;
        }
        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            %request_id,
            loaded = report.loaded,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "load run finished"
        );

        let callback = panic::catch_unwind(AssertUnwindSafe(move || on_completed(collection)));
        if let Err(payload) = callback {
            let reason = panic_message(payload.as_ref()).to_string();
            error!(%request_id, reason = %reason, "completion callback panicked");
            let _ = self
                .events
                .publish(Event::CallbackFailed { request_id, reason });
        }

        let _ = self.events.publish(Event::RunCompleted {
            request_id,
            loaded: report.loaded,
            skipped: report.skipped,
            failed: report.failed,
            elapsed_ms: report.elapsed_ms,
        });
    }

    async fn process_asset(
        &self,
        request_id: Uuid,
        mut descriptor: AssetDescriptor,
        show_progress: bool,
        collection: &mut AssetCollection,
        report: &mut RunReport,
    ) {
        // Caller-supplied descriptors may arrive unclassified.
        if descriptor.kind == AssetKind::Unknown {
            descriptor.kind = classify_path(&descriptor.path);
        }
        if descriptor.kind == AssetKind::Unknown {
            warn!(
                %request_id,
                key = %descriptor.key,
                path = %descriptor.path,
                "unclassifiable asset skipped"
            );
            report.skipped += 1;
            return;
        }

        let source = FetchSource::from_raw(&descriptor.path);
        let source_label = source.to_string();
        self.with_status(|status| {
            status.current_url = Some(source_label.clone());
            status.progress = 0.0;
        });

        let loaded = self
            .load_asset(request_id, &mut descriptor, &source, show_progress, collection)
            .await;
        match loaded {
            Ok(()) => {
                report.loaded += 1;
                debug!(
                    %request_id,
                    key = %descriptor.key,
                    kind = descriptor.kind.as_str(),
                    "asset loaded"
                );
                let _ = self.events.publish(Event::AssetLoaded {
                    request_id,
                    key: descriptor.key.clone(),
                    kind: descriptor.kind.as_str().to_string(),
                });
            }
            Err(error) => {
                report.failed += 1;
                self.fail_asset(
                    request_id,
                    descriptor.key.clone(),
                    source_label,
                    render_error_chain(&error),
                );
            }
        }
    }

    async fn load_asset(
        &self,
        request_id: Uuid,
        descriptor: &mut AssetDescriptor,
        source: &FetchSource,
        show_progress: bool,
        collection: &mut AssetCollection,
    ) -> Result<(), PipelineError> {
        let payload = self.fetch(request_id, source, show_progress).await?;

        if payload.remote {
            let name = cache::base_name(&descriptor.path).ok_or_else(|| {
                PipelineError::CacheName {
                    path: descriptor.path.clone(),
                }
            })?;
            let target = cache::store(&self.config.cache_dir, &name, &payload.bytes)
                .await
                .map_err(|source| PipelineError::Cache {
                    path: self.config.cache_dir.display().to_string(),
                    source,
                })?;
            debug!(
                %request_id,
                key = %descriptor.key,
                cached = %target.display(),
                "remote payload cached"
            );
            // Later runs resolve this asset against the cache copy.
            descriptor.path = target.display().to_string();
        }

        match descriptor.kind {
            AssetKind::Image => {
                let image =
                    decode_image(&payload.bytes).map_err(|source| PipelineError::DecodeImage {
                        key: descriptor.key.clone(),
                        source,
                    })?;
                self.with_status(|status| status.images += 1);
                collection.insert_image(descriptor.clone(), image);
            }
            AssetKind::Audio => {
                let extension = extension_of(&descriptor.path)
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                let buffer = audio::decode_audio(&extension, payload.bytes).map_err(|source| {
                    PipelineError::DecodeAudio {
                        key: descriptor.key.clone(),
                        source,
                    }
                })?;
                self.with_status(|status| status.audio += 1);
                collection.insert_audio(descriptor.clone(), buffer);
            }
            AssetKind::Video => {
                // Videos stay on disk; only the resolved path is recorded.
                descriptor.path = resolve_absolute(&descriptor.path).await;
                self.with_status(|status| status.videos += 1);
                collection.insert_video(descriptor.clone());
            }
            AssetKind::Text => {
                let text = String::from_utf8_lossy(&payload.bytes).into_owned();
                self.with_status(|status| status.texts += 1);
                collection.insert_text(descriptor.clone(), text);
            }
            // Unknown entries were dropped before the fetch.
            AssetKind::Unknown => {}
        }
        Ok(())
    }

    /// Run the fetch on its own task so a stale transfer can be aborted if
    /// the surrounding run panics.
    async fn fetch(
        &self,
        request_id: Uuid,
        source: &FetchSource,
        show_progress: bool,
    ) -> Result<FetchedPayload, PipelineError> {
        let url_label = source.to_string();
        let fetcher = Arc::clone(&self.fetcher);
        let task_source = source.clone();
        let status = Arc::clone(&self.status);
        let events = self.events.clone();
        let progress_url = url_label.clone();

        let task = tokio::spawn(async move {
            let announced = Mutex::new(f64::NEG_INFINITY);
            let observer = move |bytes: u64, total: Option<u64>| {
                let fraction = progress_fraction(bytes, total);
                {
                    let mut status = status.lock().unwrap_or_else(PoisonError::into_inner);
                    status.progress = fraction;
                }
                if !show_progress {
                    return;
                }
                let announce = {
                    let mut last = announced.lock().unwrap_or_else(PoisonError::into_inner);
                    let step = fraction >= *last + PROGRESS_EVENT_STEP;
                    let finished = fraction >= 1.0 && *last < 1.0;
                    if step || finished {
                        *last = fraction;
                    }
                    step || finished
                };
                if announce {
                    let _ = events.publish(Event::FetchProgress {
                        request_id,
                        url: progress_url.clone(),
                        fraction,
                    });
                }
            };
            fetcher.fetch(&task_source, &observer).await
        });
        self.set_fetch_slot(task.abort_handle());

        match task.await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(source)) => Err(PipelineError::Fetch {
                url: url_label,
                source,
            }),
            Err(source) => Err(PipelineError::FetchTask {
                url: url_label,
                source,
            }),
        }
    }

    fn set_fetch_slot(&self, handle: AbortHandle) {
        let mut slot = self
            .fetch_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = slot.replace(handle) {
            stale.abort();
        }
    }

    fn abort_stale_fetch(&self) {
        let mut slot = self
            .fetch_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = slot.take() {
            stale.abort();
        }
    }

    fn with_status(&self, apply: impl FnOnce(&mut LoadStatus)) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut status);
    }

    fn fail_asset(&self, request_id: Uuid, key: String, url: String, reason: String) {
        warn!(%request_id, key = %key, url = %url, reason = %reason, "asset dropped");
        let _ = self.events.publish(Event::AssetFailed {
            request_id,
            key,
            url,
            reason,
        });
    }
}

async fn resolve_absolute(path: &str) -> String {
    match tokio::fs::canonicalize(path).await {
        Ok(absolute) => absolute.display().to_string(),
        Err(error) => {
            debug!(path = %path, error = %error, "canonicalize failed, keeping original path");
            path.to_string()
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn progress_fraction(bytes: u64, total: Option<u64>) -> f64 {
    match total {
        Some(0) => 1.0,
        Some(total) => (bytes as f64 / total as f64).clamp(0.0, 1.0),
        None => 0.0,
    }
}

fn render_error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("opaque panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn progress_fraction_clamps_and_handles_unknown_totals() {
        assert_eq!(progress_fraction(0, Some(100)), 0.0);
        assert_eq!(progress_fraction(50, Some(100)), 0.5);
        assert_eq!(progress_fraction(150, Some(100)), 1.0);
        assert_eq!(progress_fraction(10, None), 0.0);
        assert_eq!(progress_fraction(0, Some(0)), 1.0);
    }

    #[test]
    fn error_chains_render_every_cause() {
        let error = PipelineError::Cache {
            path: "/tmp/cache".to_string(),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(render_error_chain(&error), "cache write failed: disk full");
    }

    #[test]
    fn panic_messages_cover_str_and_string_payloads() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new("owned message".to_string());
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(boxed.as_ref()), "opaque panic payload");
    }
}
