//! Object-storage key generation.

use std::fmt;
use uuid::Uuid;

/// Kind of object written to storage. Each kind has its own key prefix,
/// extension and content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Video,
    Segment,
    Frame,
}

impl ObjectKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ObjectKind::Video => "video",
            ObjectKind::Segment => "segment",
            ObjectKind::Frame => "frame",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ObjectKind::Video | ObjectKind::Segment => "mp4",
            ObjectKind::Frame => "jpg",
        }
    }

    /// Content type for segments and frames. Source videos carry the content
    /// type of their upload format instead.
    pub fn content_type(&self) -> &'static str {
        match self {
            ObjectKind::Video | ObjectKind::Segment => "video/mp4",
            ObjectKind::Frame => "image/jpeg",
        }
    }

    /// Generate a fresh `{kind}_{uuid}.{ext}` key.
    pub fn generate_key(&self) -> String {
        format!("{}_{}.{}", self.prefix(), Uuid::new_v4(), self.extension())
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
