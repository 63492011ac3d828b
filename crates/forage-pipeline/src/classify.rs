//! Extension-driven asset classification and folder scanning.

use std::ffi::OsStr;
use std::path::Path;

use forage_core::{AssetDescriptor, AssetKind};
use tracing::warn;
use walkdir::WalkDir;

/// Extensions classified as video.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "mkv", "webm"];
/// Extensions classified as audio.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "ogg", "aac"];
/// Extensions classified as image.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "png", "tiff", "jpeg", "psd", "tga"];
/// Extensions classified as text.
pub const TEXT_EXTENSIONS: [&str; 3] = ["txt", "json", "xml"];

/// Sidecar extension excluded from scans unconditionally.
pub const META_EXTENSION: &str = "meta";

/// File extension of a path or URL string, without the dot.
#[must_use]
pub fn extension_of(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(OsStr::to_str)
}

/// Classify a path by its extension, case-insensitively.
///
/// There is no content sniffing: an extension outside the fixed tables is
/// [`AssetKind::Unknown`].
#[must_use]
pub fn classify_path(path: &str) -> AssetKind {
    let Some(extension) = extension_of(path) else {
        return AssetKind::Unknown;
    };
    let extension = extension.to_ascii_lowercase();
    let extension = extension.as_str();
    if VIDEO_EXTENSIONS.contains(&extension) {
        AssetKind::Video
    } else if AUDIO_EXTENSIONS.contains(&extension) {
        AssetKind::Audio
    } else if IMAGE_EXTENSIONS.contains(&extension) {
        AssetKind::Image
    } else if TEXT_EXTENSIONS.contains(&extension) {
        AssetKind::Text
    } else {
        AssetKind::Unknown
    }
}

/// Scan a folder (non-recursive, regular files only) for candidate assets.
///
/// `.meta` sidecars are excluded unconditionally. Remaining files become
/// descriptors keyed by file stem, carrying their classified kind; Unknown
/// kinds are kept so the pipeline can resolve them lazily. A missing or
/// unreadable folder yields an empty list with a logged warning, never an
/// error.
#[must_use]
pub fn scan_folder(folder: &Path) -> Vec<AssetDescriptor> {
    let mut descriptors = Vec::new();
    let walk = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(folder = %folder.display(), %error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|extension| extension.eq_ignore_ascii_case(META_EXTENSION))
        {
            continue;
        }
        let Some(key) = path.file_stem().and_then(OsStr::to_str) else {
            warn!(path = %path.display(), "skipping file with undecodable name");
            continue;
        };
        let raw = path.to_string_lossy().into_owned();
        let kind = classify_path(&raw);
        descriptors.push(AssetDescriptor::new(key, raw, kind));
    }
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use forage_test_support::fixtures;

    #[test]
    fn every_table_extension_maps_to_its_kind() {
        for extension in VIDEO_EXTENSIONS {
            assert_eq!(classify_path(&format!("clip.{extension}")), AssetKind::Video);
        }
        for extension in AUDIO_EXTENSIONS {
            assert_eq!(classify_path(&format!("tone.{extension}")), AssetKind::Audio);
        }
        for extension in IMAGE_EXTENSIONS {
            assert_eq!(classify_path(&format!("pic.{extension}")), AssetKind::Image);
        }
        for extension in TEXT_EXTENSIONS {
            assert_eq!(classify_path(&format!("note.{extension}")), AssetKind::Text);
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_path("PIC.PNG"), AssetKind::Image);
        assert_eq!(classify_path("clip.Mp4"), AssetKind::Video);
        assert_eq!(classify_path("tone.WAV"), AssetKind::Audio);
    }

    #[test]
    fn unmatched_extensions_are_unknown() {
        assert_eq!(classify_path("archive.zip"), AssetKind::Unknown);
        assert_eq!(classify_path("no_extension"), AssetKind::Unknown);
        assert_eq!(classify_path("pic.png.bak"), AssetKind::Unknown);
    }

    #[test]
    fn urls_classify_by_their_trailing_extension() {
        assert_eq!(
            classify_path("https://cdn.example.com/media/a.png"),
            AssetKind::Image
        );
    }

    #[test]
    fn scan_skips_meta_sidecars_and_subdirectories() -> Result<()> {
        let dir = fixtures::asset_dir(&[
            ("a.png", b"png"),
            ("a.png.meta", b"sidecar"),
            ("c.meta", b"sidecar"),
            ("d.xyz", b"mystery"),
            ("nested/e.png", b"png"),
        ])?;

        let descriptors = scan_folder(dir.path());
        let keys: Vec<&str> = descriptors
            .iter()
            .map(|descriptor| descriptor.key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "d"]);
        assert_eq!(descriptors[0].kind, AssetKind::Image);
        assert_eq!(descriptors[1].kind, AssetKind::Unknown);
        Ok(())
    }

    #[test]
    fn scan_keys_are_file_stems_and_paths_point_into_the_folder() -> Result<()> {
        let dir = fixtures::asset_dir(&[("tone.wav", b"wav")])?;
        let descriptors = scan_folder(dir.path());
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].key, "tone");
        assert!(descriptors[0].path.starts_with(&dir.path().to_string_lossy().into_owned()));
        Ok(())
    }

    #[test]
    fn missing_folder_yields_no_candidates() {
        let descriptors = scan_folder(Path::new("/definitely/not/here"));
        assert!(descriptors.is_empty());
    }
}
