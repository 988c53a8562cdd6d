use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::{IssueApi, IssueQuery};
use crate::error::{CivicError, CivicResult};
use crate::models::{derive_title, Coordinate, Issue, PhotoPart, SubmissionPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Source of the reporter's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> CivicResult<Coordinate>;
}

/// A position supplied up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        match self.0 {
            Some(_) => PermissionStatus::Granted,
            None => PermissionStatus::Denied,
        }
    }

    async fn current_position(&self) -> CivicResult<Coordinate> {
        self.0
            .ok_or_else(|| CivicError::Permission("Location is not available".to_string()))
    }
}

/// An attached photo before it is turned into a multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub name: Option<String>,
    pub mime: Option<String>,
}

impl Photo {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            name: None,
            mime: None,
        }
    }

    pub async fn from_path(path: &Path) -> CivicResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CivicError::Permission(format!("Cannot read photo {}", path.display()))
            }
            _ => CivicError::Validation(format!("Cannot read photo {}: {}", path.display(), e)),
        })?;

        Ok(Self {
            bytes,
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            mime: guess_mime(path).map(str::to_string),
        })
    }
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// What the reporter typed and attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionDraft {
    pub description: String,
    pub title: Option<String>,
    pub photos: Vec<Photo>,
}

impl SubmissionDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub issue: Issue,
    /// The list fetched right after submitting. A failed refresh does not
    /// undo the submission.
    pub refreshed: CivicResult<Vec<Issue>>,
}

pub struct IssueSubmissionController {
    api: Arc<dyn IssueApi>,
    location: Arc<dyn LocationProvider>,
    location_enabled: bool,
}

impl IssueSubmissionController {
    pub fn new(api: Arc<dyn IssueApi>, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            api,
            location,
            location_enabled: true,
        }
    }

    /// Asks for location access up front. A denial is logged and disables
    /// submission; it is not an error.
    pub async fn init(&mut self) -> PermissionStatus {
        let status = self.location.request_permission().await;
        if status == PermissionStatus::Denied {
            warn!("Location permission not granted");
        }
        self.location_enabled = status == PermissionStatus::Granted;
        status
    }

    pub fn can_submit(&self) -> bool {
        self.location_enabled
    }

    pub async fn build_payload(&self, draft: &SubmissionDraft) -> CivicResult<SubmissionPayload> {
        if !self.location_enabled {
            return Err(CivicError::Permission(
                "Location access is required to report an issue".to_string(),
            ));
        }
        let coordinate = self.location.current_position().await?;

        let images = draft
            .photos
            .iter()
            .enumerate()
            .map(|(index, photo)| PhotoPart::new(photo.bytes.clone(), index, photo.name.clone(), photo.mime.clone()))
            .collect();

        Ok(SubmissionPayload {
            title: derive_title(draft.title.as_deref(), &draft.description),
            description: draft.description.clone(),
            coordinate,
            images,
        })
    }

    /// Submits the draft and then re-fetches the issue list.
    pub async fn submit(&self, draft: &SubmissionDraft) -> CivicResult<SubmissionReceipt> {
        let payload = self.build_payload(draft).await?;
        let issue = self.api.submit_issue(&payload).await?;
        info!("Issue {} submitted at {}", issue.id, payload.coordinate);

        let refreshed = self.api.list_issues(&IssueQuery::default()).await;
        if let Err(e) = &refreshed {
            warn!("Issue list refresh after submit failed: {}", e);
        }

        Ok(SubmissionReceipt { issue, refreshed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/b/photo.JPG")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("x.png")), Some("image/png"));
        assert_eq!(guess_mime(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn test_photo_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lamp.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let photo = Photo::from_path(&path).await.unwrap();
        assert_eq!(photo.bytes, vec![1, 2, 3]);
        assert_eq!(photo.name.as_deref(), Some("lamp.png"));
        assert_eq!(photo.mime.as_deref(), Some("image/png"));

        let missing = Photo::from_path(&dir.path().join("gone.jpg")).await.unwrap_err();
        assert!(matches!(missing, CivicError::Validation(_)));
    }

    #[tokio::test]
    async fn test_fixed_location_without_position_is_permission_failure() {
        let provider = FixedLocation(None);
        assert_eq!(provider.request_permission().await, PermissionStatus::Denied);
        assert!(matches!(
            provider.current_position().await,
            Err(CivicError::Permission(_))
        ));
    }
}
