//! Profile photo encoding
//!
//! Converts a raw pixel array into a self-contained PNG data URI that can be
//! embedded directly in markup. Pixels are encoded as given, without resizing
//! or cropping.

use crate::{Error, Result};
use base64::Engine as _;
use image::{DynamicImage, ImageBuffer, ImageFormat};
use serde::{Deserialize, Serialize, Serializer};
use std::io::Cursor;
use std::path::Path;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Row-major, interleaved 8-bit pixel array.
///
/// `channels` is 1 for a 2-D grayscale array, and 2, 3 or 4 for the last axis
/// of a 3-D array (gray+alpha, RGB, RGBA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            channels,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Load an image file (PNG, JPEG, WebP, ...) into a pixel array.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_dynamic(image::open(path)?))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, pixels) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };

        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Invariant(format!(
                "Profile image has empty dimensions {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=4).contains(&self.channels) {
            return Err(Error::Invariant(format!(
                "Profile image has {} channels, expected 1 to 4",
                self.channels
            )));
        }

        let expected = self.width as usize * self.height as usize * self.channels as usize;
        if self.pixels.len() != expected {
            return Err(Error::Invariant(format!(
                "Profile image buffer has {} bytes, expected {} ({}x{}x{})",
                self.pixels.len(),
                expected,
                self.width,
                self.height,
                self.channels
            )));
        }
        Ok(())
    }

    fn to_dynamic(&self) -> Result<DynamicImage> {
        self.validate()?;

        let (w, h, pixels) = (self.width, self.height, self.pixels.clone());
        let image = match self.channels {
            1 => ImageBuffer::from_raw(w, h, pixels).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(w, h, pixels).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(w, h, pixels).map(DynamicImage::ImageRgb8),
            _ => ImageBuffer::from_raw(w, h, pixels).map(DynamicImage::ImageRgba8),
        };

        image.ok_or_else(|| Error::Invariant("Profile image buffer does not fit".to_string()))
    }
}

/// Encoded profile photo, or the absent marker.
///
/// Serializes to the data URI, or to an empty string when absent, so templates
/// can guard the `<img>` element with a plain truthiness check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAsset(Option<String>);

impl ImageAsset {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }
}

impl Serialize for ImageAsset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Encode `image` as a lossless PNG data URI.
pub fn encode_profile_image(image: Option<&RawImage>) -> Result<ImageAsset> {
    let Some(image) = image else {
        return Ok(ImageAsset::absent());
    };

    let mut png = Vec::new();
    image
        .to_dynamic()?
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(ImageAsset(Some(format!("{}{}", DATA_URI_PREFIX, encoded))))
}

/// Run [`encode_profile_image`] on the blocking pool.
pub async fn encode_profile_image_blocking(image: Option<RawImage>) -> Result<ImageAsset> {
    tokio::task::spawn_blocking(move || encode_profile_image(image.as_ref()))
        .await
        .map_err(|e| Error::Invariant(format!("Image encoding task join error: {}", e)))?
}

/// Decode a data URI produced by [`encode_profile_image`].
pub fn decode_data_uri(uri: &str) -> Result<RawImage> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| Error::Invariant("Not a PNG data URI".to_string()))?;

    let png = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| Error::Invariant(format!("Failed to decode base64 image: {}", e)))?;

    let image = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
    Ok(RawImage::from_dynamic(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32, channels: u8) -> RawImage {
        let pixels = (0..width * height * channels as u32)
            .map(|i| (i * 7 % 256) as u8)
            .collect();
        RawImage::new(width, height, channels, pixels).unwrap()
    }

    #[test]
    fn test_absent_image_encodes_to_empty_marker() {
        let asset = encode_profile_image(None).unwrap();
        assert!(asset.is_absent());
        assert_eq!(asset.as_str(), "");
        assert_eq!(serde_json::to_value(&asset).unwrap(), "");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let image = gradient(12, 9, 3);
        let first = encode_profile_image(Some(&image)).unwrap();
        let second = encode_profile_image(Some(&image)).unwrap();

        assert_eq!(first, second);
        assert!(first.as_str().starts_with(DATA_URI_PREFIX));
    }

    #[test]
    fn test_round_trip_preserves_pixels_for_every_layout() {
        for channels in 1..=4 {
            let image = gradient(7, 5, channels);
            let asset = encode_profile_image(Some(&image)).unwrap();
            let decoded = decode_data_uri(asset.as_str()).unwrap();
            assert_eq!(decoded, image, "channels = {}", channels);
        }
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        assert!(RawImage::new(4, 4, 3, vec![0; 47]).is_err());
        assert!(RawImage::new(0, 4, 3, vec![]).is_err());
        assert!(RawImage::new(1, 1, 5, vec![0; 5]).is_err());

        let image = RawImage {
            width: 2,
            height: 2,
            channels: 3,
            pixels: vec![0; 3],
        };
        assert!(encode_profile_image(Some(&image)).is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_uri() {
        assert!(decode_data_uri("data:image/jpeg;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_open_reads_image_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let image = RawImage::open(&path).unwrap();
        assert_eq!((image.width, image.height, image.channels), (3, 2, 3));
        assert_eq!(&image.pixels[..3], &[10, 20, 30]);
    }

    #[tokio::test]
    async fn test_blocking_encoder_matches_sync_encoder() {
        let image = gradient(4, 4, 4);
        let expected = encode_profile_image(Some(&image)).unwrap();
        let actual = encode_profile_image_blocking(Some(image)).await.unwrap();
        assert_eq!(actual, expected);
    }
}
