//! Fetch abstraction shared by the pipeline and its implementations.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchResult;

/// Callback invoked as payload bytes arrive: `(bytes_so_far, total_if_known)`.
pub type ProgressObserver<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

/// Where an asset's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    /// Local file read from disk.
    File(PathBuf),
    /// Remote HTTP(S) resource.
    Url(Url),
}

impl FetchSource {
    /// Classify a raw descriptor path as remote or local.
    ///
    /// `http(s)` URLs become [`FetchSource::Url`], `file` URIs are converted
    /// back to plain paths, and everything else is treated as a local file
    /// path.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            match url.scheme() {
                "http" | "https" => return Self::Url(url),
                "file" => {
                    if let Ok(path) = url.to_file_path() {
                        return Self::File(path);
                    }
                }
                _ => {}
            }
        }
        Self::File(PathBuf::from(raw))
    }

    /// Whether fetching this source goes over the network.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Raw bytes produced by a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    /// Payload bytes, fully buffered.
    pub bytes: Vec<u8>,
    /// Whether the bytes came over the network (drives download caching).
    pub remote: bool,
}

/// Object-safe seam between the pipeline and its transport.
///
/// One fetch is in flight at a time; implementations do not need to support
/// concurrent calls on the same value, though the provided ones do.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the payload for `source`, reporting streaming progress through
    /// `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::FetchError`] when the file cannot be read, the
    /// request fails in transport, or the server answers with a non-success
    /// status.
    async fn fetch(
        &self,
        source: &FetchSource,
        on_progress: ProgressObserver<'_>,
    ) -> FetchResult<FetchedPayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_are_remote() {
        let source = FetchSource::from_raw("https://cdn.example.com/media/a.png");
        assert!(source.is_remote());
        assert_eq!(source.to_string(), "https://cdn.example.com/media/a.png");
    }

    #[test]
    fn plain_paths_are_local() {
        let source = FetchSource::from_raw("media/a.png");
        assert!(!source.is_remote());
        assert_eq!(source, FetchSource::File(PathBuf::from("media/a.png")));
        assert_eq!(
            FetchSource::from_raw("/srv/assets/a.png"),
            FetchSource::File(PathBuf::from("/srv/assets/a.png"))
        );
    }

    #[test]
    fn file_uris_convert_back_to_paths() {
        let source = FetchSource::from_raw("file:///srv/assets/a.png");
        assert_eq!(source, FetchSource::File(PathBuf::from("/srv/assets/a.png")));
    }

    #[test]
    fn unknown_schemes_fall_back_to_local_paths() {
        let source = FetchSource::from_raw("c:\\media\\a.png");
        assert_eq!(source, FetchSource::File(PathBuf::from("c:\\media\\a.png")));
    }
}
