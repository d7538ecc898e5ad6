use crate::error::{RestyleError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub const UNSUPPORTED_IMAGE_MESSAGE: &str = "Please upload a valid image file (JPEG or PNG).";

/// The two upload formats the studio accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
        }
    }

    pub fn parse(mime_type: &str) -> Result<Self> {
        match mime_type.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            _ => Err(RestyleError::InvalidInput(UNSUPPORTED_IMAGE_MESSAGE.into())),
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageMime::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageMime::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The image an operation runs against. Immutable; cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    data: Arc<[u8]>,
    mime: ImageMime,
}

impl SourceImage {
    pub fn new(data: impl Into<Vec<u8>>, mime: ImageMime) -> Result<Self> {
        let data: Vec<u8> = data.into();
        if data.is_empty() {
            return Err(RestyleError::InvalidInput("The image file is empty.".into()));
        }
        Ok(Self {
            data: data.into(),
            mime,
        })
    }

    /// Builds an image from an upload's declared MIME type, rejecting anything
    /// other than JPEG or PNG.
    pub fn from_upload(data: impl Into<Vec<u8>>, mime_type: &str) -> Result<Self> {
        let mime = ImageMime::parse(mime_type)?;
        Self::new(data, mime)
    }

    pub fn from_base64(encoded: &str, mime_type: &str) -> Result<Self> {
        let mime = ImageMime::parse(mime_type)?;
        let data = STANDARD
            .decode(strip_data_url_prefix(encoded))
            .map_err(|e| RestyleError::InvalidInput(format!("Image data is not valid base64: {}", e)))?;
        Self::new(data, mime)
    }

    /// Reads a file, classifying it by extension and falling back to its
    /// leading bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageMime::from_extension)
            .or_else(|| ImageMime::sniff(&data))
            .ok_or_else(|| RestyleError::InvalidInput(UNSUPPORTED_IMAGE_MESSAGE.into()))?;
        Self::new(data, mime)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }
}

fn strip_data_url_prefix(encoded: &str) -> &str {
    match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    }
}

/// Which remote operation produced (or is producing) an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transform,
    RemoveBackground,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transform => "transform",
            Operation::RemoveBackground => "remove_background",
        }
    }

    /// What the user sees when the call fails. Details only go to the log.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Transform => "Failed to transform the image. Please try again.",
            Operation::RemoveBackground => "Failed to remove the background. Please try again.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
#[must_use = "a generation result should be saved or applied to the session"]
pub struct GenerationResult {
    pub id: Uuid,
    pub operation: Operation,
    pub data: Vec<u8>,
    /// As reported by the model; usually `image/png`.
    pub mime_type: String,
    pub model: String,
    pub duration_ms: u64,
}

impl GenerationResult {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Turns the result into the next source image, trusting the bytes over
    /// the reported MIME type when the two disagree.
    pub fn to_source_image(&self) -> Result<SourceImage> {
        let mime = ImageMime::sniff(&self.data)
            .or_else(|| ImageMime::parse(&self.mime_type).ok())
            .ok_or_else(|| {
                RestyleError::InvalidInput(format!(
                    "Generated image type {} cannot be used as a source image",
                    self.mime_type
                ))
            })?;
        SourceImage::new(self.data.clone(), mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_BYTES: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[test]
    fn test_accepts_jpeg_and_png_only() {
        assert!(SourceImage::from_upload(PNG_BYTES.to_vec(), "image/png").is_ok());
        assert!(SourceImage::from_upload(JPEG_BYTES.to_vec(), "image/jpeg").is_ok());

        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let err = SourceImage::from_upload(PNG_BYTES.to_vec(), mime).unwrap_err();
            assert!(matches!(err, RestyleError::InvalidInput(_)), "{mime}");
        }
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = SourceImage::from_upload(Vec::new(), "image/png").unwrap_err();
        assert!(matches!(err, RestyleError::InvalidInput(_)));
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ImageMime::sniff(&PNG_BYTES), Some(ImageMime::Png));
        assert_eq!(ImageMime::sniff(&JPEG_BYTES), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::sniff(b"GIF89a"), None);
    }

    #[test]
    fn test_from_base64_accepts_data_url() {
        let image = SourceImage::from_upload(PNG_BYTES.to_vec(), "image/png").unwrap();
        let parsed = SourceImage::from_base64(&image.to_data_url(), "image/png").unwrap();
        assert_eq!(parsed, image);
        assert!(image.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_from_path_uses_extension_then_magic_bytes() {
        let dir = std::env::temp_dir().join(format!("restyle-image-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let by_ext = dir.join("photo.JPG");
        std::fs::write(&by_ext, JPEG_BYTES).unwrap();
        assert_eq!(SourceImage::from_path(&by_ext).unwrap().mime(), ImageMime::Jpeg);

        let no_ext = dir.join("upload");
        std::fs::write(&no_ext, PNG_BYTES).unwrap();
        assert_eq!(SourceImage::from_path(&no_ext).unwrap().mime(), ImageMime::Png);

        let gif = dir.join("anim.gif");
        std::fs::write(&gif, b"GIF89a......").unwrap();
        assert!(matches!(
            SourceImage::from_path(&gif),
            Err(RestyleError::InvalidInput(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_result_to_source_image() {
        let result = GenerationResult {
            id: Uuid::new_v4(),
            operation: Operation::RemoveBackground,
            data: PNG_BYTES.to_vec(),
            mime_type: "image/png".into(),
            model: "gemini-2.5-flash-image".into(),
            duration_ms: 12,
        };
        let image = result.to_source_image().unwrap();
        assert_eq!(image.mime(), ImageMime::Png);
        assert_eq!(image.data(), &PNG_BYTES[..]);

        let webp = GenerationResult {
            data: b"RIFF\0\0\0\0WEBP".to_vec(),
            mime_type: "image/webp".into(),
            ..result
        };
        assert!(webp.to_source_image().is_err());
    }

    #[test]
    fn test_operation_messages_are_generic() {
        assert!(!Operation::Transform.failure_message().contains("quota"));
        assert_eq!(Operation::RemoveBackground.as_str(), "remove_background");
    }
}
