//! Fetcher over `reqwest` for remote sources and `tokio::fs` for local ones.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{AssetFetcher, FetchSource, FetchedPayload, ProgressObserver};

/// Production fetcher: streams HTTP(S) bodies chunk-by-chunk and reads local
/// files off the runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with no request timeout.
    ///
    /// A hung fetch therefore stalls the pipeline; embedders that need a
    /// bound should use [`HttpFetcher::with_timeout`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the underlying client cannot be
    /// constructed.
    pub fn new() -> FetchResult<Self> {
        Self::build(None)
    }

    /// Build a fetcher that aborts requests exceeding `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the underlying client cannot be
    /// constructed.
    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> FetchResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    async fn fetch_url(
        &self,
        url: &Url,
        on_progress: ProgressObserver<'_>,
    ) -> FetchResult<FetchedPayload> {
        debug!(url = %url, "fetching remote asset");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let total = response.content_length();
        let mut stream = response.bytes_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
            bytes.extend_from_slice(&chunk);
            on_progress(u64::try_from(bytes.len()).unwrap_or(u64::MAX), total);
        }
        Ok(FetchedPayload {
            bytes,
            remote: true,
        })
    }
}

async fn fetch_file(path: &Path, on_progress: ProgressObserver<'_>) -> FetchResult<FetchedPayload> {
    debug!(path = %path.display(), "reading local asset");
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FetchError::File {
            path: path.display().to_string(),
            source,
        })?;
    let total = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    on_progress(total, Some(total));
    Ok(FetchedPayload {
        bytes,
        remote: false,
    })
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(
        &self,
        source: &FetchSource,
        on_progress: ProgressObserver<'_>,
    ) -> FetchResult<FetchedPayload> {
        match source {
            FetchSource::File(path) => fetch_file(path, on_progress).await,
            FetchSource::Url(url) => self.fetch_url(url, on_progress).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_files_are_read_with_a_single_progress_report() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("note.txt");
        std::fs::write(&path, b"hello bytes")?;

        let updates: Mutex<Vec<(u64, Option<u64>)>> = Mutex::new(Vec::new());
        let observer = |bytes: u64, total: Option<u64>| {
            updates.lock().unwrap().push((bytes, total));
        };

        let fetcher = HttpFetcher::new()?;
        let source = FetchSource::File(path);
        let payload = fetcher.fetch(&source, &observer).await?;

        assert_eq!(payload.bytes, b"hello bytes");
        assert!(!payload.remote);
        assert_eq!(updates.into_inner()?, vec![(11, Some(11))]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_local_files_surface_io_errors() -> Result<()> {
        let dir = TempDir::new()?;
        let fetcher = HttpFetcher::new()?;
        let source = FetchSource::File(dir.path().join("absent.png"));
        let error = fetcher.fetch(&source, &|_, _| {}).await.unwrap_err();
        assert!(matches!(error, FetchError::File { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn remote_fetches_stream_the_body_with_progress() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/media/a.png");
            then.status(200).body(b"fake image bytes");
        });

        let updates: Mutex<Vec<(u64, Option<u64>)>> = Mutex::new(Vec::new());
        let observer = |bytes: u64, total: Option<u64>| {
            updates.lock().unwrap().push((bytes, total));
        };

        let fetcher = HttpFetcher::new()?;
        let source = FetchSource::from_raw(&format!("{}/media/a.png", server.base_url()));
        let payload = fetcher.fetch(&source, &observer).await?;

        mock.assert();
        assert_eq!(payload.bytes, b"fake image bytes");
        assert!(payload.remote);
        let updates = updates.into_inner()?;
        assert_eq!(updates.last(), Some(&(16, Some(16))));
        Ok(())
    }

    #[tokio::test]
    async fn non_success_statuses_are_fetch_failures() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/media/gone.png");
            then.status(404);
        });

        let fetcher = HttpFetcher::new()?;
        let source = FetchSource::from_raw(&format!("{}/media/gone.png", server.base_url()));
        let error = fetcher.fetch(&source, &|_, _| {}).await.unwrap_err();
        assert!(
            matches!(error, FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND)
        );
        Ok(())
    }
}
