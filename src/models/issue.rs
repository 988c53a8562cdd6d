use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::{Coordinate, LocationCodec, RawLocation};
use super::{opt_string_or_number, string_or_number, vec_or_null};
use crate::constants::{FALLBACK_TITLE, TITLE_MAX_CHARS};

/// Workflow status of an issue.
///
/// Values the client does not know are kept verbatim in `Unknown` and shown
/// literally rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueStatus {
    Pending,
    Assigned,
    InProgress,
    Resolved,
    Closed,
    Unknown(String),
}

impl IssueStatus {
    pub const KNOWN: [IssueStatus; 5] = [
        IssueStatus::Pending,
        IssueStatus::Assigned,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Closed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Assigned => "assigned",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Closed => "closed",
            IssueStatus::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::Assigned => "Assigned",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Closed => "Closed",
            IssueStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, IssueStatus::Unknown(_))
    }

    /// Strict parse used for user input, where a typo should be an error.
    pub fn parse_known(raw: &str) -> Option<IssueStatus> {
        Some(IssueStatus::from(raw.trim().to_lowercase().replace([' ', '-'], "_")))
            .filter(IssueStatus::is_known)
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::Pending
    }
}

impl From<String> for IssueStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => IssueStatus::Pending,
            "assigned" => IssueStatus::Assigned,
            "in_progress" => IssueStatus::InProgress,
            "resolved" => IssueStatus::Resolved,
            "closed" => IssueStatus::Closed,
            _ => IssueStatus::Unknown(raw),
        }
    }
}

impl From<&str> for IssueStatus {
    fn from(raw: &str) -> Self {
        IssueStatus::from(raw.to_string())
    }
}

impl From<IssueStatus> for String {
    fn from(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueImage {
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

/// Cached copy of a backend issue. Updates go through the `with_*` methods,
/// which hand back a new value and leave the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub department_id: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub images: Vec<IssueImage>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Issue {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.location.as_ref().and_then(LocationCodec::parse)
    }

    pub fn is_located(&self) -> bool {
        self.coordinate().is_some()
    }

    pub fn detail_link(&self) -> String {
        format!("/issues/{}", self.id)
    }

    pub fn with_status(&self, status: IssueStatus) -> Issue {
        Issue {
            status,
            ..self.clone()
        }
    }

    /// Empty or blank ids mean "unassigned".
    pub fn with_department(&self, department_id: Option<String>) -> Issue {
        Issue {
            department_id: normalize_department(department_id),
            ..self.clone()
        }
    }

    pub fn update_payload(&self) -> IssueUpdate {
        IssueUpdate::new(self.status.clone(), self.department_id.clone())
    }
}

pub(crate) fn normalize_department(department_id: Option<String>) -> Option<String> {
    department_id.filter(|id| !id.trim().is_empty())
}

/// Body of `PATCH /issues/{id}`. `department_id` is always present and
/// serializes as `null` when unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueUpdate {
    pub status: IssueStatus,
    pub department_id: Option<String>,
}

impl IssueUpdate {
    pub fn new(status: IssueStatus, department_id: Option<String>) -> Self {
        Self {
            status,
            department_id: normalize_department(department_id),
        }
    }
}

/// Title used at submission: the explicit one if given, otherwise the first
/// 30 characters of the description, otherwise `"Issue"`.
pub fn derive_title(explicit: Option<&str>, description: &str) -> String {
    if let Some(title) = explicit.filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    if description.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    description.chars().take(TITLE_MAX_CHARS).collect()
}
