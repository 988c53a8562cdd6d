use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ViewToken;
use crate::client::IssueApi;
use crate::error::{CivicError, CivicResult};
use crate::models::{Comment, Department, Issue, IssueStatus, IssueUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Waiting on the issue fetch.
    Loading,
    Loaded,
    Saving,
    /// Holds the server's copy of the saved issue.
    SaveSucceeded(Issue),
    /// Holds the message to show; the edit buffer is kept for a retry.
    SaveFailed(String),
    /// The issue itself could not be fetched. Terminal for this id.
    Failed(String),
}

/// Staff edits that have not been sent yet.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub status: IssueStatus,
    pub department_id: Option<String>,
}

impl EditBuffer {
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            status: issue.status.clone(),
            department_id: issue.department_id.clone(),
        }
    }

    pub fn payload(&self) -> IssueUpdate {
        IssueUpdate::new(self.status.clone(), self.department_id.clone())
    }
}

/// A load request. Run it with [`LoadTicket::fetch`], possibly on another
/// task, then hand the outcome back with [`IssueDetailController::apply_load`].
pub struct LoadTicket {
    generation: u64,
    issue_id: String,
    api: Arc<dyn IssueApi>,
    token: ViewToken,
}

pub struct LoadOutcome {
    generation: u64,
    issue_id: String,
    issue: CivicResult<Issue>,
    comments: CivicResult<Vec<Comment>>,
    departments: CivicResult<Vec<Department>>,
}

impl LoadTicket {
    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    /// Runs the three fetches concurrently. Skips the network entirely if the
    /// view was torn down before the ticket ran.
    pub async fn fetch(self) -> LoadOutcome {
        if self.token.is_cancelled() {
            return LoadOutcome {
                generation: self.generation,
                issue_id: self.issue_id,
                issue: Err(CivicError::State("View closed".to_string())),
                comments: Ok(Vec::new()),
                departments: Ok(Vec::new()),
            };
        }

        let (issue, comments, departments) = tokio::join!(
            self.api.get_issue(&self.issue_id),
            self.api.list_comments(&self.issue_id),
            self.api.list_departments(),
        );

        LoadOutcome {
            generation: self.generation,
            issue_id: self.issue_id,
            issue,
            comments,
            departments,
        }
    }
}

pub struct SaveTicket {
    generation: u64,
    issue_id: String,
    update: IssueUpdate,
    api: Arc<dyn IssueApi>,
    token: ViewToken,
}

pub struct SaveOutcome {
    generation: u64,
    issue_id: String,
    result: CivicResult<Issue>,
}

impl SaveTicket {
    pub fn update(&self) -> &IssueUpdate {
        &self.update
    }

    pub async fn send(self) -> SaveOutcome {
        let result = if self.token.is_cancelled() {
            Err(CivicError::State("View closed".to_string()))
        } else {
            self.api.update_issue(&self.issue_id, &self.update).await
        };
        SaveOutcome {
            generation: self.generation,
            issue_id: self.issue_id,
            result,
        }
    }
}

/// View state for one issue: the fetched copy, its comments, the department
/// list, and the staff edit buffer.
pub struct IssueDetailController {
    api: Arc<dyn IssueApi>,
    issue_id: String,
    state: DetailState,
    issue: Option<Issue>,
    comments: Vec<Comment>,
    departments: Vec<Department>,
    edits: Option<EditBuffer>,
    message: Option<String>,
    generation: u64,
    token: ViewToken,
}

impl IssueDetailController {
    pub fn new(api: Arc<dyn IssueApi>, issue_id: impl Into<String>) -> Self {
        Self {
            api,
            issue_id: issue_id.into(),
            state: DetailState::Loading,
            issue: None,
            comments: Vec::new(),
            departments: Vec::new(),
            edits: None,
            message: None,
            generation: 0,
            token: ViewToken::new(),
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    pub fn issue(&self) -> Option<&Issue> {
        self.issue.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn edits(&self) -> Option<&EditBuffer> {
        self.edits.as_ref()
    }

    /// Last save/load message for display ("Saving...", errors, confirmations).
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn token(&self) -> ViewToken {
        self.token.clone()
    }

    pub fn is_dirty(&self) -> bool {
        match (&self.issue, &self.edits) {
            (Some(issue), Some(edits)) => *edits != EditBuffer::from_issue(issue),
            _ => false,
        }
    }

    /// Starts (or restarts) loading the current issue. Any earlier request
    /// still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = DetailState::Loading;
        self.message = None;
        debug!("Loading issue {} (generation {})", self.issue_id, self.generation);

        LoadTicket {
            generation: self.generation,
            issue_id: self.issue_id.clone(),
            api: self.api.clone(),
            token: self.token.clone(),
        }
    }

    /// Switches to another issue. Everything shown for the old one is dropped.
    pub fn navigate(&mut self, issue_id: impl Into<String>) -> LoadTicket {
        self.issue_id = issue_id.into();
        self.issue = None;
        self.comments.clear();
        self.departments.clear();
        self.edits = None;
        self.begin_load()
    }

    fn is_current(&self, generation: u64, issue_id: &str) -> bool {
        !self.token.is_cancelled() && generation == self.generation && issue_id == self.issue_id
    }

    /// Applies a finished load. Returns false if the outcome was stale and discarded.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        if !self.is_current(outcome.generation, &outcome.issue_id) {
            debug!("Discarding stale load for issue {}", outcome.issue_id);
            return false;
        }

        let issue = match outcome.issue {
            Ok(issue) => issue,
            Err(e) => {
                warn!("Failed to fetch issue {}: {}", outcome.issue_id, e);
                let message = format!("Failed to fetch issue {}: {}", outcome.issue_id, e.user_message());
                self.message = Some(message.clone());
                self.state = DetailState::Failed(message);
                return true;
            }
        };

        self.comments = outcome.comments.unwrap_or_else(|e| {
            warn!("Comments unavailable for issue {}: {}", outcome.issue_id, e);
            Vec::new()
        });
        self.departments = outcome.departments.unwrap_or_else(|e| {
            warn!("Departments unavailable: {}", e);
            Vec::new()
        });

        self.edits = Some(EditBuffer::from_issue(&issue));
        self.issue = Some(issue);
        self.state = DetailState::Loaded;
        true
    }

    pub async fn load(&mut self) -> &DetailState {
        let outcome = self.begin_load().fetch().await;
        self.apply_load(outcome);
        &self.state
    }

    pub async fn open(&mut self, issue_id: impl Into<String>) -> &DetailState {
        let outcome = self.navigate(issue_id).fetch().await;
        self.apply_load(outcome);
        &self.state
    }

    /// Moves a finished save back to `Loaded`.
    pub fn acknowledge(&mut self) {
        if matches!(self.state, DetailState::SaveSucceeded(_) | DetailState::SaveFailed(_)) {
            self.state = DetailState::Loaded;
        }
    }

    fn editable(&mut self) -> CivicResult<&mut EditBuffer> {
        self.acknowledge();
        match (&self.state, self.edits.as_mut()) {
            (DetailState::Loaded, Some(edits)) => Ok(edits),
            (state, _) => Err(CivicError::State(format!("Cannot edit while {}", state_name(state)))),
        }
    }

    /// Buffers a status change locally; nothing is sent until [`Self::save`].
    pub fn set_status(&mut self, status: IssueStatus) -> CivicResult<()> {
        self.editable()?.status = status;
        Ok(())
    }

    /// `None` or an empty id means unassigned.
    pub fn set_department(&mut self, department_id: Option<String>) -> CivicResult<()> {
        self.editable()?.department_id = department_id.filter(|id| !id.trim().is_empty());
        Ok(())
    }

    /// Sends the edit buffer. Allowed from `Loaded` and directly from a
    /// finished save, so a failed save can be retried as-is.
    pub fn begin_save(&mut self) -> CivicResult<SaveTicket> {
        self.acknowledge();
        let update = match (&self.state, &self.edits) {
            (DetailState::Loaded, Some(edits)) => edits.payload(),
            (state, _) => {
                return Err(CivicError::State(format!("Cannot save while {}", state_name(state))))
            }
        };

        self.state = DetailState::Saving;
        self.message = Some("Saving...".to_string());
        debug!("Saving issue {}: {:?}", self.issue_id, update);

        Ok(SaveTicket {
            generation: self.generation,
            issue_id: self.issue_id.clone(),
            update,
            api: self.api.clone(),
            token: self.token.clone(),
        })
    }

    /// Applies a finished save. The server's issue replaces the local copy
    /// wholesale; on failure the edit buffer is left untouched.
    pub fn apply_save(&mut self, outcome: SaveOutcome) -> bool {
        if !self.is_current(outcome.generation, &outcome.issue_id) {
            debug!("Discarding stale save for issue {}", outcome.issue_id);
            return false;
        }

        match outcome.result {
            Ok(updated) => {
                info!("Saved issue {}", outcome.issue_id);
                self.edits = Some(EditBuffer::from_issue(&updated));
                self.issue = Some(updated.clone());
                self.message = Some("Changes saved successfully!".to_string());
                self.state = DetailState::SaveSucceeded(updated);
            }
            Err(e) => {
                warn!("Failed to save issue {}: {}", outcome.issue_id, e);
                let message = format!("Error: Failed to update: {}", e.user_message());
                self.message = Some(message.clone());
                self.state = DetailState::SaveFailed(message);
            }
        }
        true
    }

    pub async fn save(&mut self) -> CivicResult<&DetailState> {
        let outcome = self.begin_save()?.send().await;
        self.apply_save(outcome);
        Ok(&self.state)
    }

    /// Called when the view goes away; in-flight results are ignored from now on.
    pub fn teardown(&mut self) {
        self.token.cancel();
    }
}

impl Drop for IssueDetailController {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn state_name(state: &DetailState) -> &'static str {
    match state {
        DetailState::Loading => "loading",
        DetailState::Loaded => "loaded",
        DetailState::Saving => "saving",
        DetailState::SaveSucceeded(_) => "saved",
        DetailState::SaveFailed(_) => "save failed",
        DetailState::Failed(_) => "failed",
    }
}
