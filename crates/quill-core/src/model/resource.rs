use serde::{Deserialize, Serialize};

/// Metadata for an attached resource (image, PDF, …).
///
/// The file itself lives under the resource directory as
/// `<id>.<file_extension>`; only metadata is kept in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub mime: String,
    /// Extension without the leading dot, e.g. `jpg`.
    pub file_extension: String,
    pub size: i64,
    /// Empty when the resource is not part of a share.
    pub share_id: String,
    pub is_shared: bool,
    pub created_time: i64,
    pub updated_time: i64,
}

impl Default for Resource {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            mime: String::new(),
            file_extension: String::new(),
            size: 0,
            share_id: String::new(),
            is_shared: false,
            created_time: 0,
            updated_time: 0,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "avif", "bmp", "gif", "ico", "jpeg", "jpg", "png", "svg", "tif", "tiff", "webp",
];

impl Resource {
    /// Filename of the backing file under the resource directory.
    #[must_use]
    pub fn filename(&self) -> String {
        if self.file_extension.is_empty() {
            self.id.clone()
        } else {
            format!("{}.{}", self.id, self.file_extension)
        }
    }

    /// True for resources rendered inline as images. Only these get a
    /// cache-busting query parameter on their absolute URLs.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
            || IMAGE_EXTENSIONS.contains(&self.file_extension.to_ascii_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Resource;

    #[test]
    fn image_detection_by_mime_or_extension() {
        let jpg = Resource {
            file_extension: "jpg".into(),
            ..Default::default()
        };
        assert!(jpg.is_image());

        let pdf = Resource {
            mime: "application/pdf".into(),
            file_extension: "pdf".into(),
            ..Default::default()
        };
        assert!(!pdf.is_image());

        let by_mime = Resource {
            mime: "image/x-custom".into(),
            ..Default::default()
        };
        assert!(by_mime.is_image());
    }

    #[test]
    fn filename_includes_extension_when_present() {
        let r = Resource {
            id: "ab".repeat(16),
            file_extension: "png".into(),
            ..Default::default()
        };
        assert_eq!(r.filename(), format!("{}.png", "ab".repeat(16)));
    }
}
