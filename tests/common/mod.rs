#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use civic_issues::client::{IssueApi, IssueQuery};
use civic_issues::error::{CivicError, CivicResult};
use civic_issues::models::{
    Comment, Department, Issue, IssueStatus, IssueUpdate, IssuesByTime, RawLocation, SubmissionPayload,
};

pub fn issue(id: &str, status: IssueStatus) -> Issue {
    Issue {
        id: id.to_string(),
        title: format!("Issue {}", id),
        description: "Something is broken".to_string(),
        status,
        department_id: None,
        location: Some(RawLocation::Text("12.97,77.59".to_string())),
        images: Vec::new(),
        category: Some("roads".to_string()),
        user_id: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn comment(id: &str, text: &str) -> Comment {
    Comment {
        id: id.to_string(),
        issue_id: None,
        user_id: None,
        text: text.to_string(),
        created_at: None,
    }
}

pub fn server_error(detail: &str) -> CivicError {
    CivicError::Http {
        status: 500,
        detail: detail.to_string(),
    }
}

/// In-memory backend. Failures are toggled through the flags between calls.
#[derive(Default)]
pub struct StubApi {
    pub issues: Mutex<Vec<Issue>>,
    pub comments: Mutex<Vec<Comment>>,
    pub departments: Mutex<Vec<Department>>,
    pub fail_get: Mutex<bool>,
    pub fail_comments: Mutex<bool>,
    pub fail_departments: Mutex<bool>,
    pub fail_update: Mutex<Option<String>>,
    pub fail_list: Mutex<bool>,
    pub updates: Mutex<Vec<(String, IssueUpdate)>>,
    pub submissions: Mutex<Vec<SubmissionPayload>>,
    pub list_calls: Mutex<usize>,
}

impl StubApi {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues: Mutex::new(issues),
            ..Self::default()
        }
    }

    pub fn set(&self, flag: &Mutex<bool>, value: bool) {
        *flag.lock().unwrap() = value;
    }
}

#[async_trait]
impl IssueApi for StubApi {
    async fn list_issues(&self, _query: &IssueQuery) -> CivicResult<Vec<Issue>> {
        *self.list_calls.lock().unwrap() += 1;
        if *self.fail_list.lock().unwrap() {
            return Err(CivicError::Network("offline".to_string()));
        }
        Ok(self.issues.lock().unwrap().clone())
    }

    async fn get_issue(&self, issue_id: &str) -> CivicResult<Issue> {
        if *self.fail_get.lock().unwrap() {
            return Err(server_error("Database unavailable"));
        }
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == issue_id)
            .cloned()
            .ok_or_else(|| CivicError::Http {
                status: 404,
                detail: "Issue not found".to_string(),
            })
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> CivicResult<Issue> {
        self.updates
            .lock()
            .unwrap()
            .push((issue_id.to_string(), update.clone()));
        if let Some(detail) = self.fail_update.lock().unwrap().clone() {
            return Err(server_error(&detail));
        }

        let mut issues = self.issues.lock().unwrap();
        let stored = issues
            .iter_mut()
            .find(|i| i.id == issue_id)
            .ok_or_else(|| server_error("Issue not found"))?;
        stored.status = update.status.clone();
        stored.department_id = update.department_id.clone();
        stored.updated_at = Some("2024-05-02T10:00:00Z".to_string());
        Ok(stored.clone())
    }

    async fn list_comments(&self, _issue_id: &str) -> CivicResult<Vec<Comment>> {
        if *self.fail_comments.lock().unwrap() {
            return Err(server_error("comments table missing"));
        }
        Ok(self.comments.lock().unwrap().clone())
    }

    async fn list_departments(&self) -> CivicResult<Vec<Department>> {
        if *self.fail_departments.lock().unwrap() {
            return Err(server_error("departments unavailable"));
        }
        Ok(self.departments.lock().unwrap().clone())
    }

    async fn submit_issue(&self, payload: &SubmissionPayload) -> CivicResult<Issue> {
        self.submissions.lock().unwrap().push(payload.clone());
        let mut created = issue("new-1", IssueStatus::Pending);
        created.title = payload.title.clone();
        created.description = payload.description.clone();
        self.issues.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn issues_by_time(&self, _days: u32) -> CivicResult<Vec<IssuesByTime>> {
        Ok(Vec::new())
    }
}
