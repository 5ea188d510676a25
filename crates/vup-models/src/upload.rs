//! Upload request and format recognition.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ModelError, ModelResult};
use crate::video::Visibility;

/// Recognised source container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Avi,
    Mov,
    Mkv,
    Wmv,
    Flv,
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 6] = [
        VideoFormat::Mp4,
        VideoFormat::Avi,
        VideoFormat::Mov,
        VideoFormat::Mkv,
        VideoFormat::Wmv,
        VideoFormat::Flv,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Avi => "avi",
            VideoFormat::Mov => "mov",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Wmv => "wmv",
            VideoFormat::Flv => "flv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Avi => "video/x-msvideo",
            VideoFormat::Mov => "video/quicktime",
            VideoFormat::Mkv => "video/x-matroska",
            VideoFormat::Wmv => "video/x-ms-wmv",
            VideoFormat::Flv => "video/x-flv",
        }
    }

    /// Recognise a filename by its extension, case-insensitive.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// File part of an upload.
#[derive(Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A new video upload as handed over by the HTTP boundary.
#[derive(Debug, Clone, Validate)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,

    #[validate(custom(function = "not_blank"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(custom(function = "not_blank"))]
    pub owner_id: String,

    pub visibility: Visibility,
}

/// A request that passed validation, with its recognised format.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub format: VideoFormat,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub visibility: Visibility,
}

impl UploadRequest {
    /// Check the file first, then the metadata fields.
    pub fn into_validated(self) -> ModelResult<ValidatedUpload> {
        let file = match self.file.as_ref() {
            Some(f) if !f.is_empty() => f,
            _ => return Err(ModelError::validation("Video file is required")),
        };

        let file_name = file
            .file_name
            .clone()
            .ok_or_else(|| ModelError::validation("Invalid video file format"))?;
        let format = VideoFormat::from_filename(&file_name)
            .ok_or_else(|| ModelError::validation("Invalid video file format"))?;

        self.validate()
            .map_err(|e| ModelError::validation(e.to_string()))?;

        let bytes = self.file.map(|f| f.bytes).unwrap_or_default();
        Ok(ValidatedUpload {
            file_name,
            bytes,
            format,
            title: self.title.trim().to_string(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            owner_id: self.owner_id,
            visibility: self.visibility,
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(file: Option<UploadedFile>, title: &str) -> UploadRequest {
        UploadRequest {
            file,
            title: title.to_string(),
            description: None,
            owner_id: "owner-1".to_string(),
            visibility: Visibility::Public,
        }
    }

    #[test]
    fn test_recognised_extensions() {
        for name in ["a.mp4", "b.AVI", "c.Mov", "d.mkv", "e.WMV", "f.flv", "x.y.mp4"] {
            assert!(VideoFormat::from_filename(name).is_some(), "{name}");
        }
        for name in ["a.gif", "noext", "mp4", "a.mp4.txt"] {
            assert!(VideoFormat::from_filename(name).is_none(), "{name}");
        }
    }

    #[test]
    fn test_missing_or_empty_file_rejected() {
        assert!(request(None, "t").into_validated().is_err());
        let empty = UploadedFile::new("a.mp4", Vec::new());
        let err = request(Some(empty), "t").into_validated().unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_unrecognised_extension_rejected() {
        let file = UploadedFile::new("notes.txt", vec![1, 2, 3]);
        let err = request(Some(file), "t").into_validated().unwrap_err();
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_blank_title_rejected() {
        let file = UploadedFile::new("a.mp4", vec![1]);
        assert!(request(Some(file), "   ").into_validated().is_err());
    }

    #[test]
    fn test_valid_upload() {
        let file = UploadedFile::new("Holiday.MKV", vec![1, 2, 3]);
        let upload = request(Some(file), " Holiday ").into_validated().unwrap();
        assert_eq!(upload.format, VideoFormat::Mkv);
        assert_eq!(upload.format.content_type(), "video/x-matroska");
        assert_eq!(upload.title, "Holiday");
        assert_eq!(upload.bytes.len(), 3);
    }
}
