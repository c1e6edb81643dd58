use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An object as reported by the store's listing call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object key (opaque string; new uploads use server-generated UUIDs)
    pub key: String,
    /// Object size in bytes
    pub size: i64,
    /// Last-modified timestamp, when the store reports one
    pub last_modified: Option<DateTime<Utc>>,
}

/// Operation a signed URL authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Read the object
    Get,
    /// Write the full object
    Put,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Get => write!(f, "get"),
            Operation::Put => write!(f, "put"),
        }
    }
}

/// A time-bounded URL authorizing exactly one (object, operation) pair.
/// Issuance is stateless: nothing tracks a URL after it is handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    /// Instant after which the URL must not be used
    pub expires_at: DateTime<Utc>,
}

/// Put-capable signed URL for a freshly generated key, issued once per
/// page render. The object does not exist until the client completes
/// the PUT against this URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTicket {
    pub key: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Read-side projection of a stored object plus a fresh get-capable
/// signed URL. Lives for one render cycle; never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub key: String,
    pub url: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl GalleryEntry {
    /// Display name: the last path segment of the key
    pub fn filename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// Size in megabytes, for display
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// Everything one page render needs: the upload ticket plus the gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageData {
    pub upload: UploadTicket,
    pub images: Vec<GalleryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_filename_is_last_path_segment() {
        let entry = GalleryEntry {
            key: "photos/2024/a.png".to_string(),
            url: "https://example.com/signed".to_string(),
            size: 1024,
            last_modified: Some(Utc::now()),
        };
        assert_eq!(entry.filename(), "a.png");
    }

    #[test]
    fn test_filename_without_path() {
        let entry = GalleryEntry {
            key: "a.png".to_string(),
            url: String::new(),
            size: 0,
            last_modified: None,
        };
        assert_eq!(entry.filename(), "a.png");
    }

    #[test]
    fn test_size_mb() {
        let entry = GalleryEntry {
            key: "a.png".to_string(),
            url: String::new(),
            size: 3 * 1024 * 1024,
            last_modified: None,
        };
        assert!((entry.size_mb() - 3.0).abs() < f64::EPSILON);
    }
}
