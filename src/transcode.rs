//! Pure image transcoder: decode, downscale, re-encode.
//!
//! The transcoder is a total function over arbitrary bytes. Anything
//! that fails to decode, fails to encode, or re-encodes larger than the
//! input comes back unchanged. Callers never see an error from this
//! module.

use crate::profile::QualityProfile;
use color_quant::NeuQuant;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};
use std::borrow::Cow;

/// NeuQuant sampling factor: 1 is exhaustive, 30 is fastest. 10 is a
/// good speed/fidelity trade-off for slide-deck media.
const QUANT_SAMPLE_FACTOR: i32 = 10;

/// Palette size for quantized PNG output (8-bit indexed).
const QUANT_PALETTE_COLORS: usize = 256;

/// Re-encode raw image bytes under the given profile.
///
/// Returns `Cow::Owned` with a strictly smaller encoding, or
/// `Cow::Borrowed` with the input bytes untouched. The result is never
/// larger than the input.
///
/// Encoding strategy:
/// - PNG with `quality < 75`: quantize to an 8-bit palette (alpha kept
///   via tRNS) and re-encode.
/// - PNG otherwise: lossless re-encode at maximum compression.
/// - JPEG, TIFF, BMP, GIF: flatten to RGB and encode as JPEG at the
///   profile quality.
/// - Anything else, or any decode/encode failure: unchanged.
///
/// # Example
///
/// ```no_run
/// use pptslim::{transcode, Tier};
///
/// let raw = std::fs::read("photo.jpg")?;
/// let out = transcode(&raw, &Tier::Strong.profile());
/// assert!(out.len() <= raw.len());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn transcode<'a>(raw: &'a [u8], profile: &QualityProfile) -> Cow<'a, [u8]> {
    match try_transcode(raw, profile) {
        Some(smaller) => Cow::Owned(smaller),
        None => Cow::Borrowed(raw),
    }
}

/// The fallible interior: `None` means "keep the original bytes",
/// for whatever reason.
fn try_transcode(raw: &[u8], profile: &QualityProfile) -> Option<Vec<u8>> {
    let format = image::guess_format(raw).ok()?;
    if !is_supported_raster(format) {
        return None;
    }

    let img = image::load_from_memory_with_format(raw, format).ok()?;
    let img = downscale_to_width(img, profile.max_width);

    let encoded = match format {
        ImageFormat::Png if profile.quantizes_png() => encode_indexed_png(&img)?,
        ImageFormat::Png => encode_png(&img)?,
        _ => encode_jpeg(&img, profile.quality)?,
    };

    // Regression guard: never hand back a larger payload.
    (encoded.len() < raw.len()).then_some(encoded)
}

/// Raster kinds the transcoder will re-encode. Extension filtering
/// upstream may admit content that decodes to something else entirely;
/// that content passes through untouched.
fn is_supported_raster(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Tiff
            | ImageFormat::Bmp
            | ImageFormat::Gif
    )
}

/// Scale down to `max_width`, preserving aspect ratio. Images at or
/// below the ceiling pass through untouched; nothing is ever upscaled.
fn downscale_to_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= max_width {
        return img;
    }

    let aspect = height as f64 / width as f64;
    let new_height = ((max_width as f64 * aspect).round() as u32).max(1);
    DynamicImage::ImageRgba8(imageops::resize(
        &img,
        max_width,
        new_height,
        FilterType::Lanczos3,
    ))
}

/// Lossless PNG re-encode at maximum compression, full color depth.
fn encode_png(img: &DynamicImage) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilterType::Adaptive);
    img.write_with_encoder(encoder).ok()?;
    Some(out)
}

/// Quantize to a 256-color palette and write an 8-bit indexed PNG.
///
/// Transparency survives: palette alpha goes into the tRNS chunk.
/// Error-diffusion dithering masks banding in gradients.
fn encode_indexed_png(img: &DynamicImage) -> Option<Vec<u8>> {
    let mut rgba = img.to_rgba8();
    let quantizer = NeuQuant::new(QUANT_SAMPLE_FACTOR, QUANT_PALETTE_COLORS, rgba.as_raw());
    imageops::dither(&mut rgba, &quantizer);

    let indices: Vec<u8> = rgba
        .pixels()
        .map(|p| quantizer.index_of(&p.0) as u8)
        .collect();

    let palette_rgba = quantizer.color_map_rgba();
    let mut palette = Vec::with_capacity(QUANT_PALETTE_COLORS * 3);
    let mut alpha = Vec::with_capacity(QUANT_PALETTE_COLORS);
    for entry in palette_rgba.chunks_exact(4) {
        palette.extend_from_slice(&entry[..3]);
        alpha.push(entry[3]);
    }

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, rgba.width(), rgba.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    encoder.set_trns(alpha);
    encoder.set_compression(png::Compression::Best);

    let mut writer = encoder.write_header().ok()?;
    writer.write_image_data(&indices).ok()?;
    writer.finish().ok()?;

    Some(out)
}

/// Flatten to RGB and encode as JPEG at the given quality.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Option<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(&rgb).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Tier;
    use image::{Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Deterministic pseudo-random RGBA image. Noise defeats PNG's
    /// filters, so the truecolor encoding is near-incompressible and
    /// the indexed re-encoding is reliably smaller.
    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut seed = 0x2545F4914F6CDD1Du64;
        let img = RgbaImage::from_fn(width, height, |_, _| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let b = seed.to_le_bytes();
            Rgba([b[0], b[1], b[2], 255])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn gradient_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode_image(&img).unwrap();
        out
    }

    fn png_color_type(data: &[u8]) -> png::ColorType {
        let decoder = png::Decoder::new(Cursor::new(data));
        let reader = decoder.read_info().unwrap();
        reader.info().color_type
    }

    #[test]
    fn test_undecodable_bytes_unchanged() {
        let raw = b"definitely not an image".to_vec();
        let out = transcode(&raw, &Tier::Extreme.profile());
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&*out, raw.as_slice());
    }

    #[test]
    fn test_truncated_png_unchanged() {
        // Valid PNG signature, garbage body: guess_format succeeds,
        // decode fails, bytes pass through.
        let mut raw = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        raw.extend_from_slice(&[0xFF; 16]);
        let out = transcode(&raw, &Tier::Extreme.profile());
        assert_eq!(&*out, raw.as_slice());
    }

    #[test]
    fn test_png_quantized_below_threshold() {
        let raw = noise_png(256, 256);
        let out = transcode(&raw, &Tier::Extreme.profile());
        assert!(out.len() < raw.len());
        assert_eq!(png_color_type(&out), png::ColorType::Indexed);
    }

    #[test]
    fn test_png_keeps_color_depth_at_threshold() {
        // Balanced is quality 75: at the threshold, no quantization.
        let raw = noise_png(128, 128);
        let out = transcode(&raw, &Tier::Balanced.profile());
        assert_ne!(png_color_type(&out), png::ColorType::Indexed);
    }

    #[test]
    fn test_resize_bound_and_aspect() {
        let raw = noise_png(2000, 1000);
        let out = transcode(&raw, &Tier::Extreme.profile());
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.width(), 1024);
        assert_eq!(img.height(), 512);
    }

    #[test]
    fn test_no_upscale() {
        let raw = gradient_jpeg(100, 80, 90);
        let out = transcode(&raw, &Tier::Extreme.profile());
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (100, 80));
    }

    #[test]
    fn test_jpeg_reencoded_smaller() {
        let raw = gradient_jpeg(800, 600, 95);
        let out = transcode(&raw, &Tier::Extreme.profile());
        assert!(out.len() < raw.len());
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_regression_guard() {
        // A 1x1 PNG is already near-minimal; any re-encode that fails
        // to beat it must fall back to the original bytes.
        let img = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let mut raw = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)
            .unwrap();

        let out = transcode(&raw, &Tier::Extreme.profile());
        assert!(out.len() <= raw.len());
    }

    #[test]
    fn test_bmp_converted_to_jpeg() {
        let img = image::RgbImage::from_fn(300, 200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut raw = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut raw), ImageFormat::Bmp)
            .unwrap();

        let out = transcode(&raw, &Tier::Strong.profile());
        // Uncompressed BMP re-encoded as JPEG is dramatically smaller.
        assert!(out.len() < raw.len());
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_transparency_survives_quantization() {
        let img = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let mut raw = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)
            .unwrap();

        let out = transcode(&raw, &Tier::Extreme.profile());
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        // The transparent half must still be transparent.
        assert_eq!(decoded.get_pixel(60, 30).0[3], 0);
        assert_eq!(decoded.get_pixel(10, 30).0[3], 255);
    }
}
