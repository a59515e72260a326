// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Base64 image codec for drawings posted to the API

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Maximum image size (10MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Prefix browsers put in front of canvas exports (`data:image/png;base64,`)
const DATA_URI_PREFIX: &str = "data:image";

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Malformed data URI")]
    MalformedDataUri,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Output formats for [`encode_base64_image`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeFormat {
    #[default]
    Jpeg,
    Png,
}

impl EncodeFormat {
    fn image_format(self) -> ImageFormat {
        match self {
            EncodeFormat::Jpeg => ImageFormat::Jpeg,
            EncodeFormat::Png => ImageFormat::Png,
        }
    }

    /// MIME subtype used in the data URI
    pub fn mime_subtype(self) -> &'static str {
        match self {
            EncodeFormat::Jpeg => "jpeg",
            EncodeFormat::Png => "png",
        }
    }
}

/// Strip a `data:image/...;base64,` prefix if present
pub fn strip_data_uri(input: &str) -> Result<&str, ImageError> {
    if !input.starts_with(DATA_URI_PREFIX) {
        return Ok(input);
    }
    input
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or(ImageError::MalformedDataUri)
}

/// Decode a base64-encoded image, with or without a data URI prefix
///
/// # Example
/// ```ignore
/// let (image, info) = decode_base64_image("data:image/png;base64,iVBORw0KGgo...")?;
/// println!("Image size: {}x{}", info.width, info.height);
/// ```
pub fn decode_base64_image(base64_str: &str) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let payload = strip_data_uri(base64_str.trim())?;
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(payload)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes (CLI file input)
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Encode an RGB image as a `data:image/<fmt>;base64,...` URI
pub fn encode_base64_image(image: &RgbImage, format: EncodeFormat) -> Result<String, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buffer, format.image_format())
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    Ok(format!(
        "data:image/{};base64,{}",
        format.mime_subtype(),
        STANDARD.encode(buffer.into_inner())
    ))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    // 1x1 red PNG image (base64)
    const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    // GIF magic bytes (base64 of "GIF89a" + minimal data)
    const TINY_GIF_BASE64: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

    #[test]
    fn test_decode_base64_image_png() {
        let result = decode_base64_image(TINY_PNG_BASE64);
        assert!(result.is_ok(), "Failed to decode PNG: {:?}", result.err());

        let (img, info) = result.unwrap();
        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
        assert_eq!(info.format, ImageFormat::Png);
        assert!(img.width() == 1 && img.height() == 1);
    }

    #[test]
    fn test_decode_strips_data_uri_prefix() {
        let uri = format!("data:image/png;base64,{}", TINY_PNG_BASE64);
        let (_, info) = decode_base64_image(&uri).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
    }

    #[test]
    fn test_data_uri_without_payload_separator() {
        let result = decode_base64_image("data:image/png;base64");
        assert!(matches!(result.unwrap_err(), ImageError::MalformedDataUri));
    }

    #[test]
    fn test_decode_base64_image_gif() {
        let (_img, info) = decode_base64_image(TINY_GIF_BASE64).unwrap();
        assert_eq!(info.format, ImageFormat::Gif);
    }

    #[test]
    fn test_decode_base64_image_invalid_base64() {
        let result = decode_base64_image("not-valid-base64!!!");
        assert!(matches!(result.unwrap_err(), ImageError::InvalidBase64(_)));
    }

    #[test]
    fn test_decode_base64_image_empty() {
        assert!(matches!(
            decode_base64_image("").unwrap_err(),
            ImageError::EmptyData
        ));
        assert!(matches!(
            decode_base64_image("data:image/png;base64,").unwrap_err(),
            ImageError::EmptyData
        ));
    }

    #[test]
    fn test_decode_base64_image_unsupported_format() {
        let random_bytes = STANDARD.encode([0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
        let result = decode_base64_image(&random_bytes);
        assert!(matches!(result.unwrap_err(), ImageError::UnsupportedFormat));
    }

    #[test]
    fn test_decode_base64_image_corrupted() {
        // PNG header but corrupted data
        let corrupted = STANDARD.encode([0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x00]);
        let result = decode_base64_image(&corrupted);
        assert!(matches!(result.unwrap_err(), ImageError::DecodeFailed(_)));
    }

    #[test]
    fn test_encode_decode_preserves_dimensions() {
        let img = RgbImage::from_pixel(37, 21, Rgb([10, 200, 30]));

        for format in [EncodeFormat::Jpeg, EncodeFormat::Png] {
            let uri = encode_base64_image(&img, format).unwrap();
            assert!(uri.starts_with(&format!("data:image/{};base64,", format.mime_subtype())));

            let (decoded, info) = decode_base64_image(&uri).unwrap();
            assert_eq!((info.width, info.height), (37, 21));
            assert_eq!((decoded.width(), decoded.height()), (37, 21));
        }
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(1, 2, Rgb([255, 0, 128]));
        let uri = encode_base64_image(&img, EncodeFormat::Png).unwrap();
        let (decoded, _) = decode_base64_image(&uri).unwrap();
        assert_eq!(decoded.to_rgb8(), img);
    }

    #[test]
    fn test_detect_format_headers() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);

        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);

        let webp_header = [
            0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50,
        ];
        assert_eq!(detect_format(&webp_header).unwrap(), ImageFormat::WebP);

        let gif_header = [0x47, 0x49, 0x46, 0x38, 0x37, 0x61];
        assert_eq!(detect_format(&gif_header).unwrap(), ImageFormat::Gif);
    }

    #[test]
    fn test_detect_format_unknown() {
        assert!(detect_format(&[0x00, 0x00, 0x00, 0x00]).is_err());
        assert!(detect_format(&[0x89]).is_err());
    }

    #[test]
    fn test_decode_image_bytes_too_large() {
        let large_bytes = vec![0u8; MAX_IMAGE_SIZE + 1];
        let result = decode_image_bytes(&large_bytes);
        assert!(matches!(result.unwrap_err(), ImageError::TooLarge(_, _)));
    }
}
