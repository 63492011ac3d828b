//! Canned asset bytes and on-disk folder fixtures.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// 4x4 opaque red RGBA PNG.
pub const TINY_PNG: [u8; 75] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04,
    0x08, 0x06, 0x00, 0x00, 0x00, 0xA9, 0xF1, 0x9E, 0x7E, 0x00, 0x00, 0x00,
    0x12, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0xF8, 0xCF, 0xC0, 0xF0,
    0x1F, 0x19, 0x33, 0x90, 0x2E, 0x00, 0x00, 0x3C, 0x40, 0x1F, 0xE1, 0x1A,
    0xF3, 0xA5, 0x48, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// 16-bit PCM mono WAV at 8 kHz holding the four samples in
/// [`TINY_WAV_SAMPLES`].
pub const TINY_WAV: [u8; 52] = [
    0x52, 0x49, 0x46, 0x46, 0x2C, 0x00, 0x00, 0x00, 0x57, 0x41, 0x56, 0x45,
    0x66, 0x6D, 0x74, 0x20, 0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x40, 0x1F, 0x00, 0x00, 0x80, 0x3E, 0x00, 0x00, 0x02, 0x00, 0x10, 0x00,
    0x64, 0x61, 0x74, 0x61, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40,
    0x00, 0xC0, 0xFF, 0x7F,
];

/// Normalized samples encoded in [`TINY_WAV`].
pub const TINY_WAV_SAMPLES: [f32; 4] = [0.0, 0.5, -0.5, 32_767.0 / 32_768.0];

/// Create a temporary directory populated with the given `(name, bytes)`
/// files. Names may contain subdirectories.
///
/// # Errors
///
/// Fails when the directory or one of the files cannot be created.
pub fn asset_dir(files: &[(&str, &[u8])]) -> Result<TempDir> {
    let dir = TempDir::new().context("create temp asset dir")?;
    for (name, bytes) in files {
        write_file(dir.path(), name, bytes)?;
    }
    Ok(dir)
}

/// Write one file under `root`, creating intermediate directories.
///
/// # Errors
///
/// Fails when a directory or the file itself cannot be written.
pub fn write_file(root: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create fixture dir for {name}"))?;
    }
    fs::write(&path, bytes).with_context(|| format!("write fixture {name}"))?;
    Ok(())
}
