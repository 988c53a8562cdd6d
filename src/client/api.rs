use async_trait::async_trait;

use crate::error::CivicResult;
use crate::models::{Comment, Department, Issue, IssueUpdate, IssuesByTime, SubmissionPayload};

/// Filters for `GET /issues`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl IssueQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

/// The backend operations the controllers depend on. `CivicClient` is the
/// HTTP implementation; tests plug in their own.
#[async_trait]
pub trait IssueApi: Send + Sync {
    async fn list_issues(&self, query: &IssueQuery) -> CivicResult<Vec<Issue>>;

    async fn get_issue(&self, issue_id: &str) -> CivicResult<Issue>;

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> CivicResult<Issue>;

    async fn list_comments(&self, issue_id: &str) -> CivicResult<Vec<Comment>>;

    async fn list_departments(&self) -> CivicResult<Vec<Department>>;

    async fn submit_issue(&self, payload: &SubmissionPayload) -> CivicResult<Issue>;

    async fn issues_by_time(&self, days: u32) -> CivicResult<Vec<IssuesByTime>>;
}
