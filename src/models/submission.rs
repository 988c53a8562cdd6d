use crate::constants::DEFAULT_PHOTO_MIME;

use super::location::Coordinate;

/// One `images` part of the multipart submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPart {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl PhotoPart {
    /// Missing names become `photo-<index>.jpg`, missing types `image/jpeg`.
    pub fn new(bytes: Vec<u8>, index: usize, filename: Option<String>, mime: Option<String>) -> Self {
        Self {
            bytes,
            filename: filename
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("photo-{}.jpg", index)),
            mime: mime
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_PHOTO_MIME.to_string()),
        }
    }
}

/// Everything `POST /issues` needs, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub title: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub images: Vec<PhotoPart>,
}

impl SubmissionPayload {
    /// Text fields in the order they are sent.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("lat", self.coordinate.lat.to_string()),
            ("lng", self.coordinate.lng.to_string()),
        ]
    }
}
