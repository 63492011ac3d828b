//! Fake transport implementations for pipeline tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use forage_fetch::{
    AssetFetcher, FetchError, FetchResult, FetchSource, FetchedPayload, ProgressObserver,
};

/// Scripted response for one source label.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Successful payload.
    Bytes {
        /// Payload bytes to return.
        bytes: Vec<u8>,
        /// Whether the payload should be flagged as remote.
        remote: bool,
    },
    /// Failure carrying the given reason, surfaced as a read error.
    Failure(String),
}

/// Programmable fetcher for exercising the pipeline without a network.
///
/// Responses are scripted per source label (the `Display` form of the
/// [`FetchSource`]); unscripted local files are read from disk so folder
/// fixtures work without per-file scripting, while unscripted remote sources
/// fail. An optional artificial delay keeps runs in flight while a test
/// enqueues more work.
#[derive(Debug, Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, StubResponse>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl StubFetcher {
    /// Fetcher with no scripted responses and no delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an artificial delay before every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script the response for a source label.
    pub fn script(&self, label: impl Into<String>, response: StubResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label.into(), response);
    }

    /// Labels fetched so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AssetFetcher for StubFetcher {
    async fn fetch(
        &self,
        source: &FetchSource,
        on_progress: ProgressObserver<'_>,
    ) -> FetchResult<FetchedPayload> {
        let label = source.to_string();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(label.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&label)
            .cloned();
        if let Some(response) = scripted {
            return match response {
                StubResponse::Bytes { bytes, remote } => {
                    let total = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
                    on_progress(total, Some(total));
                    Ok(FetchedPayload { bytes, remote })
                }
                StubResponse::Failure(reason) => Err(FetchError::File {
                    path: label,
                    source: io::Error::other(reason),
                }),
            };
        }
        match source {
            FetchSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|error| FetchError::File {
                    path: path.display().to_string(),
                    source: error,
                })?;
                let total = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
                on_progress(total, Some(total));
                Ok(FetchedPayload {
                    bytes,
                    remote: false,
                })
            }
            FetchSource::Url(_) => Err(FetchError::File {
                path: label,
                source: io::Error::other("no scripted response for remote source"),
            }),
        }
    }
}
