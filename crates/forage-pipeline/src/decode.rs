//! Image decoding and mipmap chain generation.

use forage_core::{ImageBuffer, MipLevel};
use image::RgbaImage;
use image::imageops::FilterType;

/// Decode image bytes (format sniffed from the payload, not the extension)
/// into an RGBA buffer with a generated mipmap chain.
///
/// Level zero is the source image; each further level halves both dimensions
/// (floored, clamped to 1) with a triangle filter until 1x1. Sources never
/// carry their own mipmaps here, they are always generated.
///
/// # Errors
///
/// Returns the decoder error when the payload is not a supported image
/// format; the caller treats this as a recoverable per-asset failure.
pub fn decode_image(bytes: &[u8]) -> Result<ImageBuffer, image::ImageError> {
    let base: RgbaImage = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = base.dimensions();
    let mut levels = Vec::new();
    let mut current = base;
    loop {
        let (level_width, level_height) = current.dimensions();
        levels.push(MipLevel {
            width: level_width,
            height: level_height,
            rgba: current.as_raw().clone(),
        });
        if level_width == 1 && level_height == 1 {
            break;
        }
        let next_width = (level_width / 2).max(1);
        let next_height = (level_height / 2).max(1);
        current = image::imageops::resize(&current, next_width, next_height, FilterType::Triangle);
    }
    Ok(ImageBuffer {
        width,
        height,
        levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use forage_test_support::fixtures::TINY_PNG;

    #[test]
    fn png_decodes_with_a_generated_mip_chain() -> Result<()> {
        let image = decode_image(&TINY_PNG)?;
        assert_eq!(image.width, 4);
        assert_eq!(image.height, 4);
        assert_eq!(image.level_count(), 3);
        assert_eq!(
            image
                .levels
                .iter()
                .map(|level| (level.width, level.height))
                .collect::<Vec<_>>(),
            vec![(4, 4), (2, 2), (1, 1)]
        );
        for level in &image.levels {
            assert_eq!(level.rgba.len(), (level.width * level.height * 4) as usize);
        }
        // The fixture is uniformly red; halving must preserve that.
        let base = &image.levels[0].rgba;
        assert_eq!(&base[..4], &[255, 0, 0, 255]);
        let tip = &image.levels[2].rgba;
        assert_eq!(tip.as_slice(), &[255, 0, 0, 255]);
        Ok(())
    }

    #[test]
    fn non_square_images_clamp_to_one_pixel() -> Result<()> {
        // 4x1 gray PNG encoded in-memory.
        let source = RgbaImage::from_pixel(4, 1, image::Rgba([7, 7, 7, 255]));
        let mut bytes = Vec::new();
        source.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;

        let image = decode_image(&bytes)?;
        assert_eq!(
            image
                .levels
                .iter()
                .map(|level| (level.width, level.height))
                .collect::<Vec<_>>(),
            vec![(4, 1), (2, 1), (1, 1)]
        );
        Ok(())
    }

    #[test]
    fn undecodable_payloads_error() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
