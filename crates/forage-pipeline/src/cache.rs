//! Download cache for remote payloads.
//!
//! Remote bytes land in a flat folder keyed by the source's base name so a
//! later run can be pointed at the cache instead of the network. Writes are
//! last-writer-wins; two sources sharing a base name overwrite each other.

use std::io;
use std::path::{Path, PathBuf};

use url::Url;

/// Write `bytes` under `cache_dir`, creating the folder on first use.
///
/// Returns the path of the cached copy.
///
/// # Errors
///
/// Propagates the I/O error when the folder or file cannot be written.
pub async fn store(cache_dir: &Path, source_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(cache_dir).await?;
    let target = cache_dir.join(source_name);
    tokio::fs::write(&target, bytes).await?;
    Ok(target)
}

/// Derive the cache file name for a raw source string.
///
/// URLs contribute their final path segment; everything else is treated as a
/// filesystem path and contributes its file name. Returns `None` when no
/// usable name exists, such as a URL ending in `/`.
#[must_use]
pub fn base_name(raw: &str) -> Option<String> {
    let remote = Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"));
    if let Some(url) = remote {
        return url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned);
    }
    Path::new(raw)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn base_name_prefers_the_final_url_segment() {
        assert_eq!(
            base_name("https://cdn.example.com/packs/alpha/hero.png"),
            Some("hero.png".to_string())
        );
        assert_eq!(base_name("https://cdn.example.com/"), None);
        assert_eq!(
            base_name("/srv/assets/theme.wav"),
            Some("theme.wav".to_string())
        );
        assert_eq!(
            base_name("relative/clip.mp4"),
            Some("clip.mp4".to_string())
        );
    }

    #[tokio::test]
    async fn store_creates_the_folder_and_overwrites() -> Result<()> {
        let root = tempdir()?;
        let cache = root.path().join("cache");

        let first = store(&cache, "hero.png", b"one").await?;
        assert_eq!(std::fs::read(&first)?, b"one");

        let second = store(&cache, "hero.png", b"two").await?;
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second)?, b"two");
        Ok(())
    }
}
