use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::api::{IssueApi, IssueQuery};
use crate::config::Config;
use crate::constants::CONNECT_TIMEOUT_SECS;
use crate::error::{CivicError, CivicResult};
use crate::identity::Session;
use crate::models::*;

/// HTTP client for the civic issues backend.
pub struct CivicClient {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl CivicClient {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> CivicResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CivicError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config) -> CivicResult<Self> {
        Self::new(
            &config.api_url,
            Session::from_config(config),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Adds the bearer credential when the session has one.
    fn authorize(&self, request: RequestBuilder) -> CivicResult<RequestBuilder> {
        match self.session.bearer() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| CivicError::Configuration("Access token is not a valid header".to_string()))?;
                Ok(request.header(AUTHORIZATION, value))
            }
            None => Ok(request),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> CivicResult<T> {
        let response = self.authorize(request)?.send().await?;
        let text = check_response(response).await?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| CivicError::Network(format!("Unexpected response body ({}): {}", e, text)))
    }

    async fn send_list<T: DeserializeOwned>(&self, request: RequestBuilder) -> CivicResult<Vec<T>> {
        let response = self.authorize(request)?.send().await?;
        let text = check_response(response).await?.text().await?;
        decode_list(&text)
    }

    pub async fn staff_issues(&self) -> CivicResult<Vec<Issue>> {
        self.send_list(self.client.get(self.url("/issues/staff/me"))).await
    }

    /// Server-side shortcut that also moves the issue to `assigned`.
    pub async fn assign_issue(&self, issue_id: &str, department_id: &str) -> CivicResult<Issue> {
        let request = self
            .client
            .post(self.url(&format!("/issues/{}/assign", issue_id)))
            .query(&[("department_id", department_id)]);
        self.send_json(request).await
    }

    pub async fn resolve_issue(&self, issue_id: &str) -> CivicResult<Issue> {
        self.send_json(self.client.post(self.url(&format!("/issues/{}/resolve", issue_id))))
            .await
    }

    pub async fn response_times(&self, days: u32) -> CivicResult<ResponseTimes> {
        let request = self
            .client
            .get(self.url("/admin/analytics/response-times"))
            .query(&[("days", days)]);
        self.send_json(request).await
    }

    pub async fn hotspots(&self, days: u32) -> CivicResult<Vec<Hotspot>> {
        let request = self
            .client
            .get(self.url("/admin/analytics/hotspots"))
            .query(&[("days", days)]);
        self.send_list(request).await
    }
}

#[async_trait]
impl IssueApi for CivicClient {
    async fn list_issues(&self, query: &IssueQuery) -> CivicResult<Vec<Issue>> {
        let request = self.client.get(self.url("/issues")).query(&query.params());
        let issues: Vec<Issue> = self.send_list(request).await?;
        debug!("Fetched {} issues", issues.len());
        Ok(issues)
    }

    async fn get_issue(&self, issue_id: &str) -> CivicResult<Issue> {
        self.send_json(self.client.get(self.url(&format!("/issues/{}", issue_id))))
            .await
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> CivicResult<Issue> {
        let request = self
            .client
            .patch(self.url(&format!("/issues/{}", issue_id)))
            .json(update);
        let issue: Issue = self.send_json(request).await?;
        info!("Updated issue {} to status {}", issue_id, issue.status);
        Ok(issue)
    }

    async fn list_comments(&self, issue_id: &str) -> CivicResult<Vec<Comment>> {
        self.send_list(self.client.get(self.url(&format!("/issues/{}/comments", issue_id))))
            .await
    }

    async fn list_departments(&self) -> CivicResult<Vec<Department>> {
        self.send_list(self.client.get(self.url("/departments/"))).await
    }

    async fn submit_issue(&self, payload: &SubmissionPayload) -> CivicResult<Issue> {
        let mut form = Form::new();
        for (name, value) in payload.text_fields() {
            form = form.text(name, value);
        }
        for photo in &payload.images {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.filename.clone())
                .mime_str(&photo.mime)
                .map_err(|_| CivicError::Validation(format!("Invalid MIME type '{}'", photo.mime)))?;
            form = form.part("images", part);
        }

        if !self.session.is_authenticated() {
            debug!("Submitting issue anonymously");
        }

        let request = self.client.post(self.url("/issues")).multipart(form);
        let issue: Issue = self.send_json(request).await?;
        info!("Submitted issue {} with {} photo(s)", issue.id, payload.images.len());
        Ok(issue)
    }

    async fn issues_by_time(&self, days: u32) -> CivicResult<Vec<IssuesByTime>> {
        let request = self
            .client
            .get(self.url("/admin/analytics/issues-by-time"))
            .query(&[("days", days)]);
        self.send_list(request).await
    }
}

/// Turns a non-2xx response into `CivicError::Http` carrying the server's detail.
pub async fn check_response(response: Response) -> CivicResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CivicError::Http {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

/// Pulls `error` or `detail` out of a JSON error body; otherwise the raw text.
pub fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error").or_else(|| map.get("detail")) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}

/// Accepts a bare array or an object wrapping one under `data` or `issues`.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> CivicResult<Vec<T>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CivicError::Network(format!("Unexpected response body ({}): {}", e, body)))?;

    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("issues")) {
            Some(Value::Null) => Value::Array(Vec::new()),
            Some(inner) => inner,
            None => return Err(CivicError::Network(format!("Expected a list in response: {}", body))),
        },
        Value::Null => Value::Array(Vec::new()),
        _ => return Err(CivicError::Network(format!("Expected a list in response: {}", body))),
    };

    Ok(serde_json::from_value(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail() {
        assert_eq!(extract_detail(r#"{"error":"Issue not found"}"#), "Issue not found");
        assert_eq!(extract_detail(r#"{"detail":"Forbidden"}"#), "Forbidden");
        assert_eq!(extract_detail("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(extract_detail(r#"{"other":1}"#), r#"{"other":1}"#);
    }

    #[test]
    fn test_decode_list_shapes() {
        let bare: Vec<Department> = decode_list(r#"[{"id":1,"name":"Roads"}]"#).unwrap();
        assert_eq!(bare[0].id, "1");

        let wrapped: Vec<Department> = decode_list(r#"{"data":[{"id":"w","name":"Water"}]}"#).unwrap();
        assert_eq!(wrapped[0].name, "Water");

        let empty: Vec<Department> = decode_list(r#"{"data":null}"#).unwrap();
        assert!(empty.is_empty());

        assert!(decode_list::<Department>("<html>").unwrap_err().is_network());
        assert!(decode_list::<Department>(r#"{"count":3}"#).unwrap_err().is_network());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CivicClient::new("http://localhost:8000/", Session::anonymous(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/issues"), "http://localhost:8000/issues");
    }
}
