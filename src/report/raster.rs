use std::sync::atomic::{AtomicU64, Ordering};

use image::{imageops::FilterType, RgbaImage};

use crate::util::assets::AssetError;

static NEXT_IMAGE_KEY: AtomicU64 = AtomicU64::new(1);

/// Decoded image, held only for the duration of one render call.
///
/// Clones share a [`key`](RasterImage::key), so a backend can store the pixels
/// once and reference them from every page that draws the same image.
#[derive(Clone, Debug)]
pub struct RasterImage {
    key: u64,
    pixels: RgbaImage,
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        self.pixels == other.pixels
    }
}

impl RasterImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|err| AssetError::Decode(err.to_string()))?;
        let pixels = decoded.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(AssetError::Decode("image has no pixels".to_string()));
        }
        Ok(Self::from_rgba(pixels))
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            key: NEXT_IMAGE_KEY.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    /// Identity of these pixels; equal for clones, distinct for every decode.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Height / width.
    pub fn aspect(&self) -> f32 {
        self.height() as f32 / self.width() as f32
    }

    /// Shrinks to fit inside `max_width` x `max_height`, keeping the aspect ratio.
    /// Never enlarges.
    pub fn thumbnail(&self, max_width: f32, max_height: f32) -> RasterImage {
        let (width, height) = fit_within(self.width(), self.height(), max_width, max_height);
        if (width, height) == (self.width(), self.height()) {
            return self.clone();
        }
        Self::from_rgba(image::imageops::resize(
            &self.pixels,
            width,
            height,
            FilterType::Triangle,
        ))
    }

    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect()
    }

    /// Alpha channel, or `None` when the image is fully opaque.
    pub fn alpha_bytes(&self) -> Option<Vec<u8>> {
        if self.pixels.pixels().all(|p| p.0[3] == u8::MAX) {
            return None;
        }
        Some(self.pixels.pixels().map(|p| p.0[3]).collect())
    }
}

/// Target size for thumbnail semantics: scale down so both bounds hold,
/// never scale up, keep at least one pixel per side.
pub fn fit_within(width: u32, height: u32, max_width: f32, max_height: f32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_width / width as f32)
        .min(max_height / height as f32)
        .min(1.0);
    if scale >= 1.0 {
        return (width, height);
    }
    let scaled = |side: u32| ((side as f32 * scale).floor() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba};

    use super::*;

    fn png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, alpha]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within(100, 50, 480.0, 226.0), (100, 50));
    }

    #[test]
    fn fit_shrinks_to_the_tighter_bound() {
        // width-bound
        assert_eq!(fit_within(1000, 200, 500.0, 400.0), (500, 100));
        // height-bound
        assert_eq!(fit_within(800, 800, 480.0, 200.0), (200, 200));
    }

    #[test]
    fn thumbnail_preserves_aspect_ratio() {
        let image = RasterImage::decode(&png(600, 300, 255)).unwrap();
        let thumb = image.thumbnail(300.0, 300.0);
        assert_eq!((thumb.width(), thumb.height()), (300, 150));
    }

    #[test]
    fn opaque_images_have_no_alpha_channel() {
        let opaque = RasterImage::decode(&png(4, 4, 255)).unwrap();
        assert!(opaque.alpha_bytes().is_none());
        assert_eq!(opaque.rgb_bytes().len(), 4 * 4 * 3);

        let translucent = RasterImage::decode(&png(4, 4, 128)).unwrap();
        assert_eq!(translucent.alpha_bytes().map(|a| a.len()), Some(16));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            RasterImage::decode(b"definitely not an image"),
            Err(AssetError::Decode(_))
        ));
    }
}
