//! Image fetch/decode/clamp/re-encode pipeline (C7, spec.md §4.6).

use super::cache::CachedImage;
use crate::error::{BoxError, ErrorContext};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Output container format requested for an image tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// Parameters the fetcher carries through to the origin image request
/// (spec.md §4.6 "Fetch").
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub user_agent: String,
    pub accept_language: String,
    pub cookie_header: Option<String>,
    pub referer: Option<String>,
}

pub async fn fetch_image(
    client: &reqwest::Client,
    url: &str,
    ctx: &FetchContext,
) -> Result<Vec<u8>, BoxError> {
    let mut req = client.get(url).header("User-Agent", &ctx.user_agent).header(
        "Accept-Language",
        &ctx.accept_language,
    );
    if let Some(cookie) = &ctx.cookie_header {
        req = req.header("Cookie", cookie);
    }
    if let Some(referer) = &ctx.referer {
        req = req.header("Referer", referer);
    }
    let resp = req.send().await.context("fetching image")?;
    let bytes = resp.bytes().await.context("reading image body")?;
    Ok(bytes.to_vec())
}

/// Decode, clamp to `screen_width`, and re-encode per spec.md §4.6.
/// `requested_format` may be overridden to PNG if the source carries an
/// alpha channel sampled on a <=64x64 grid.
pub fn transcode_image(
    raw: &[u8],
    requested_format: OutputFormat,
    screen_width: u32,
    high_quality: bool,
) -> Result<(OutputFormat, CachedImage), BoxError> {
    let decoded = image::load_from_memory(raw).context("decoding image")?;
    let (src_w, src_h) = decoded.dimensions();

    let format = if requested_format == OutputFormat::Jpeg && has_alpha_sampled(&decoded) {
        OutputFormat::Png
    } else {
        requested_format
    };

    let clamped = if src_w > screen_width {
        let new_h = ((u64::from(src_h) * u64::from(screen_width)) / u64::from(src_w).max(1)) as u32;
        decoded.resize(screen_width, new_h.max(1), image::imageops::FilterType::CatmullRom)
    } else {
        decoded
    };
    let (w, h) = clamped.dimensions();

    let encoded = encode(&clamped, format, high_quality)?;
    debug!(format = format.label(), width = w, height = h, "transcoded image");
    Ok((
        format,
        CachedImage {
            width: w.min(u32::from(u16::MAX)) as u16,
            height: h.min(u32::from(u16::MAX)) as u16,
            bytes: encoded,
        },
    ))
}

/// Sample alpha on a grid no larger than 64x64 (spec.md §4.6) to decide
/// whether a JPEG request should be promoted to PNG.
fn has_alpha_sampled(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return false;
    }
    let step_x = (w / 64).max(1);
    let step_y = (h / 64).max(1);
    let mut x = 0;
    while x < w {
        let mut y = 0;
        while y < h {
            let pixel = image.get_pixel(x, y);
            if pixel.0[3] != 255 {
                return true;
            }
            y += step_y;
        }
        x += step_x;
    }
    false
}

fn encode(image: &DynamicImage, format: OutputFormat, high_quality: bool) -> Result<Vec<u8>, BoxError> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let quality = if high_quality { 85 } else { 40 };
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
            encoder.encode_image(&image.to_rgb8()).context("encoding JPEG")?;
        }
        OutputFormat::Png => {
            let compression = if high_quality {
                image::codecs::png::CompressionType::Best
            } else {
                image::codecs::png::CompressionType::Default
            };
            let encoder = image::codecs::png::PngEncoder::new_with_quality(
                &mut out,
                compression,
                image::codecs::png::FilterType::Adaptive,
            );
            image::ImageEncoder::write_image(
                encoder,
                image.to_rgba8().as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .context("encoding PNG")?;
        }
    }
    Ok(out)
}

/// Crop to `rect` (clamped to the source image's bounds) and encode,
/// for CSS background-image region fetches (spec.md §4.6 "Region
/// fetch"): a sprite sheet is fetched once at full size and the same
/// `(x, y, w, h)` rect always produces the same cropped bytes, so the
/// cache key just needs the rect baked in.
pub fn transcode_image_region(
    raw: &[u8],
    rect: (u32, u32, u32, u32),
    requested_format: OutputFormat,
    high_quality: bool,
) -> Result<(OutputFormat, CachedImage), BoxError> {
    let decoded = image::load_from_memory(raw).context("decoding image")?;
    let (src_w, src_h) = decoded.dimensions();
    let (x, y, w, h) = rect;
    let x = x.min(src_w.saturating_sub(1));
    let y = y.min(src_h.saturating_sub(1));
    let w = w.min(src_w.saturating_sub(x)).max(1);
    let h = h.min(src_h.saturating_sub(y)).max(1);
    let cropped = decoded.crop_imm(x, y, w, h);

    let format = if requested_format == OutputFormat::Jpeg && has_alpha_sampled(&cropped) {
        OutputFormat::Png
    } else {
        requested_format
    };
    let encoded = encode(&cropped, format, high_quality)?;
    Ok((
        format,
        CachedImage {
            width: w.min(u32::from(u16::MAX)) as u16,
            height: h.min(u32::from(u16::MAX)) as u16,
            bytes: encoded,
        },
    ))
}

/// Minimum quality floor for the first-chance encode of an inlined
/// data-URI image (spec.md §4.6: "never below 60").
pub fn data_uri_quality_floor(requested: u8) -> u8 {
    requested.max(60)
}

/// Best-effort format sniff, used when a URL carries no usable
/// extension (e.g. a CDN query-string image endpoint).
pub fn sniff_format(raw: &[u8]) -> Option<ImageFormat> {
    image::guess_format(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_png(w: u32, h: u32, alpha: u8) -> Vec<u8> {
        let mut img = image::RgbaImage::new(w, h);
        for p in img.pixels_mut() {
            *p = image::Rgba([200, 100, 50, alpha]);
        }
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn clamps_width_to_screen_preserving_aspect() {
        let raw = solid_png(480, 240, 255);
        let (_, image) = transcode_image(&raw, OutputFormat::Png, 240, true).unwrap();
        assert_eq!(image.width, 240);
        assert_eq!(image.height, 120);
    }

    #[test]
    fn jpeg_request_promotes_to_png_when_alpha_present() {
        let raw = solid_png(32, 32, 128);
        let (format, _) = transcode_image(&raw, OutputFormat::Jpeg, 240, true).unwrap();
        assert_eq!(format, OutputFormat::Png);
    }

    #[test]
    fn opaque_source_keeps_requested_jpeg_format() {
        let raw = solid_png(32, 32, 255);
        let (format, _) = transcode_image(&raw, OutputFormat::Jpeg, 240, true).unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
    }

    #[test]
    fn data_uri_quality_never_drops_below_60() {
        assert_eq!(data_uri_quality_floor(40), 60);
        assert_eq!(data_uri_quality_floor(90), 90);
    }

    #[test]
    fn region_crop_yields_requested_dimensions() {
        let raw = solid_png(64, 64, 255);
        let (_, image) = transcode_image_region(&raw, (8, 8, 16, 16), OutputFormat::Png, true).unwrap();
        assert_eq!(image.width, 16);
        assert_eq!(image.height, 16);
    }

    #[test]
    fn region_crop_clamps_to_source_bounds() {
        let raw = solid_png(32, 32, 255);
        let (_, image) = transcode_image_region(&raw, (20, 20, 100, 100), OutputFormat::Png, true).unwrap();
        assert_eq!(image.width, 12);
        assert_eq!(image.height, 12);
    }
}
