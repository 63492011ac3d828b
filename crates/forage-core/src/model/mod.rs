//! Core asset domain types and DTOs shared across the workspace.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic classification of a candidate file, driving fetch and decode strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Still image decoded to an RGBA buffer with generated mipmaps.
    Image,
    /// Audio payload decoded to samples or retained encoded.
    Audio,
    /// Video file referenced by path; never eagerly decoded.
    Video,
    /// Plain text payload.
    Text,
    /// Extension not present in any classification table.
    #[default]
    Unknown,
}

impl AssetKind {
    /// Machine-friendly label used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// One candidate asset discovered by a scan or supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Unique key derived from the file name without its extension.
    pub key: String,
    /// Absolute source path or URL; rewritten once if the payload is re-hosted
    /// in the download cache.
    pub path: String,
    /// Classified kind; `Unknown` entries are re-resolved lazily and dropped if
    /// still unclassified.
    pub kind: AssetKind,
}

impl AssetDescriptor {
    /// Convenience constructor.
    #[must_use]
    pub fn new(key: impl Into<String>, path: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            kind,
        }
    }
}

/// A single mipmap level of a decoded image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MipLevel {
    /// Level width in pixels.
    pub width: u32,
    /// Level height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixel data.
    pub rgba: Vec<u8>,
}

/// Decoded image with a generated mipmap chain.
///
/// Level zero is the full-resolution image; each subsequent level halves both
/// dimensions (clamped to one pixel) down to 1x1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageBuffer {
    /// Full-resolution width in pixels.
    pub width: u32,
    /// Full-resolution height in pixels.
    pub height: u32,
    /// Mipmap chain, largest level first. Never empty.
    pub levels: Vec<MipLevel>,
}

impl ImageBuffer {
    /// Number of mipmap levels, including the base image.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Audio container formats recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// RIFF/WAVE, decoded to PCM in-process.
    Wav,
    /// MPEG layer III, retained encoded.
    Mp3,
    /// Ogg container, retained encoded.
    Ogg,
    /// AAC/ADTS, retained encoded.
    Aac,
}

impl AudioFormat {
    /// Machine-friendly label used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Aac => "aac",
        }
    }
}

/// Decoded (or deliberately undecoded) audio payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioBuffer {
    /// Uncompressed samples decoded in-process.
    Pcm {
        /// Samples per second.
        sample_rate: u32,
        /// Interleaved channel count.
        channels: u16,
        /// Interleaved samples normalised to the `-1.0..=1.0` range.
        samples: Vec<f32>,
    },
    /// Compressed payload retained for the embedding audio backend to decode
    /// at play time.
    Encoded {
        /// Container format inferred from the file extension.
        format: AudioFormat,
        /// Raw payload bytes.
        bytes: Vec<u8>,
    },
}

impl AudioBuffer {
    /// Playback duration in seconds, when known (PCM only).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        match self {
            Self::Pcm {
                sample_rate,
                channels,
                samples,
            } => {
                if *sample_rate == 0 || *channels == 0 {
                    return None;
                }
                let frames = samples.len() / usize::from(*channels);
                Some(frames as f64 / f64::from(*sample_rate))
            }
            Self::Encoded { .. } => None,
        }
    }

    /// Whether the payload was decoded to raw samples.
    #[must_use]
    pub const fn is_pcm(&self) -> bool {
        matches!(self, Self::Pcm { .. })
    }
}

/// Per-run output aggregate delivered to the caller's completion callback.
///
/// Every key present in a per-kind map is also present in `descriptors`; the
/// `insert_*` helpers keep the maps aligned. Re-inserting an existing key
/// replaces the previous entry (last load wins).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AssetCollection {
    /// Every successfully processed asset, keyed by asset key.
    pub descriptors: HashMap<String, AssetDescriptor>,
    /// Decoded image buffers.
    pub images: HashMap<String, ImageBuffer>,
    /// Decoded or retained audio buffers.
    pub audio: HashMap<String, AudioBuffer>,
    /// Decoded text payloads.
    pub texts: HashMap<String, String>,
    /// Resolved absolute paths for video assets.
    pub video_paths: HashMap<String, String>,
}

impl AssetCollection {
    /// Construct an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decoded image under the descriptor's key.
    pub fn insert_image(&mut self, descriptor: AssetDescriptor, image: ImageBuffer) {
        self.images.insert(descriptor.key.clone(), image);
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Record an audio buffer under the descriptor's key.
    pub fn insert_audio(&mut self, descriptor: AssetDescriptor, audio: AudioBuffer) {
        self.audio.insert(descriptor.key.clone(), audio);
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Record a text payload under the descriptor's key.
    pub fn insert_text(&mut self, descriptor: AssetDescriptor, text: String) {
        self.texts.insert(descriptor.key.clone(), text);
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Record a video asset; only the resolved path is stored.
    pub fn insert_video(&mut self, descriptor: AssetDescriptor) {
        self.video_paths
            .insert(descriptor.key.clone(), descriptor.path.clone());
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Number of successfully processed assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether any asset was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether an asset with the given key was processed.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.descriptors.contains_key(key)
    }
}

/// Where a load request's candidate assets come from.
#[derive(Debug, Clone)]
pub enum LoadSource {
    /// Scan a directory (non-recursive) for candidate files.
    Folder(String),
    /// Process a caller-supplied descriptor list, bypassing the scan.
    Descriptors(Vec<AssetDescriptor>),
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(path) => write!(f, "folder:{path}"),
            Self::Descriptors(list) => write!(f, "descriptors:{}", list.len()),
        }
    }
}

/// Callback invoked with the populated collection when a run finishes.
pub type CompletionHandler = Box<dyn FnOnce(AssetCollection) + Send + 'static>;

/// One load request; immutable after enqueue, consumed on dispatch.
pub struct LoadRequest {
    /// Candidate source for this run.
    pub source: LoadSource,
    /// Whether progress events should be published while this run fetches.
    pub show_progress: bool,
    /// Completion callback receiving ownership of the result collection.
    pub on_completed: CompletionHandler,
}

impl LoadRequest {
    /// Request a scan-and-load of a directory.
    #[must_use]
    pub fn folder(
        path: impl Into<String>,
        show_progress: bool,
        on_completed: impl FnOnce(AssetCollection) + Send + 'static,
    ) -> Self {
        Self {
            source: LoadSource::Folder(path.into()),
            show_progress,
            on_completed: Box::new(on_completed),
        }
    }

    /// Request processing of an explicit descriptor list.
    #[must_use]
    pub fn descriptors(
        descriptors: Vec<AssetDescriptor>,
        show_progress: bool,
        on_completed: impl FnOnce(AssetCollection) + Send + 'static,
    ) -> Self {
        Self {
            source: LoadSource::Descriptors(descriptors),
            show_progress,
            on_completed: Box::new(on_completed),
        }
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("source", &self.source)
            .field("show_progress", &self.show_progress)
            .field("on_completed", &"<callback>")
            .finish()
    }
}

/// Observational snapshot of the loader exposed while runs execute.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoadStatus {
    /// Images decoded so far in the current run.
    pub images: usize,
    /// Audio buffers produced so far in the current run.
    pub audio: usize,
    /// Video paths recorded so far in the current run.
    pub videos: usize,
    /// Text payloads decoded so far in the current run.
    pub texts: usize,
    /// URL or path of the in-flight fetch, if any.
    pub current_url: Option<String>,
    /// Download progress of the in-flight fetch in the `0.0..=1.0` range.
    pub progress: f64,
    /// Whether a run is active.
    pub busy: bool,
}

/// Per-run statistics attached to the completion event and logged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Assets inserted into the collection.
    pub loaded: usize,
    /// Assets dropped before fetching (unknown kind, sidecar files).
    pub skipped: usize,
    /// Assets dropped by fetch or decode failures.
    pub failed: usize,
    /// Wall-clock run duration in milliseconds.
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Total candidates considered by the run.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.loaded + self.skipped + self.failed
    }
}
