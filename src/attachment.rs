//! Image attachments and their file handles

mod preview;

pub use preview::{Preview, PreviewRegistry};

use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::Path;
use std::sync::Arc;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An in-memory file selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    /// Create a file, inferring the media type from the name
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let media_type = mime_guess::from_path(&name)
            .first()
            .map_or_else(|| FALLBACK_MEDIA_TYPE.to_string(), |m| m.essence_str().to_string());
        Self {
            name,
            media_type,
            bytes: bytes.into(),
        }
    }

    /// Create a file with an explicit media type
    #[allow(dead_code)] // For sources that report their own content type
    pub fn with_media_type(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// A staged or sent image with its preview reference
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub id: String,
    pub file: ImageFile,
    /// Shared so transcript snapshots keep the preview alive; released when
    /// the last holder drops it
    pub preview: Arc<Preview>,
    pub name: String,
}

impl UploadedImage {
    pub fn new(file: ImageFile, previews: &PreviewRegistry) -> Self {
        let preview = Arc::new(previews.create(&file));
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: file.name.clone(),
            file,
            preview,
        }
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

impl PartialEq for UploadedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// File bytes are not part of the wire representation
impl Serialize for UploadedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("UploadedImage", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("preview", self.preview.url())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_inferred_from_name() {
        assert_eq!(ImageFile::new("leaf.jpg", vec![1u8]).media_type, "image/jpeg");
        assert_eq!(ImageFile::new("leaf.PNG", vec![1u8]).media_type, "image/png");
        assert_eq!(ImageFile::new("notes.txt", vec![1u8]).media_type, "text/plain");
        assert_eq!(ImageFile::new("blob", vec![1u8]).media_type, FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn test_is_image() {
        assert!(ImageFile::with_media_type("x", "image/webp", vec![0u8]).is_image());
        assert!(!ImageFile::with_media_type("x.png", "application/pdf", vec![0u8]).is_image());
    }

    #[test]
    fn test_serialize_omits_bytes() {
        let previews = PreviewRegistry::new();
        let image = UploadedImage::new(ImageFile::new("maize.jpg", vec![9u8; 16]), &previews);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["name"], "maize.jpg");
        assert_eq!(json["id"], image.id.as_str());
        assert!(json["preview"].as_str().unwrap().starts_with("blob:agri-assist/"));
        assert!(json.get("file").is_none());
    }

    #[tokio::test]
    async fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomato.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = ImageFile::read(&path).await.unwrap();
        assert_eq!(file.name, "tomato.png");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.bytes.as_ref(), &[1u8, 2, 3]);
    }
}
