use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::client::{IssueApi, IssueQuery};
use crate::models::{Issue, IssueStatus};
use crate::viz::{compute_markers, compute_viewport, ChartPoint, Marker, Viewport};

/// Issue list as the dashboard shows it. Fetch failures end up in
/// `error_message`; the previous list stays on screen.
pub struct IssueBoard {
    api: Arc<dyn IssueApi>,
    pub query: IssueQuery,
    pub issues: Vec<Issue>,
    pub filtered_issues: Vec<Issue>,
    pub search_query: String,
    pub error_message: Option<String>,
}

impl IssueBoard {
    pub fn new(api: Arc<dyn IssueApi>, query: IssueQuery) -> Self {
        Self {
            api,
            query,
            issues: Vec::new(),
            filtered_issues: Vec::new(),
            search_query: String::new(),
            error_message: None,
        }
    }

    /// Returns true when the list was replaced.
    pub async fn refresh(&mut self) -> bool {
        self.error_message = None;

        match self.api.list_issues(&self.query).await {
            Ok(issues) => {
                self.issues = issues;
                self.apply_filters();
                true
            }
            Err(e) => {
                warn!("Failed to load issues: {}", e);
                self.error_message = Some(format!("Failed to load issues: {}", e.user_message()));
                false
            }
        }
    }

    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.apply_filters();
    }

    pub fn apply_filters(&mut self) {
        self.filtered_issues = self.issues.clone();

        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            self.filtered_issues.retain(|issue| {
                issue.title.to_lowercase().contains(&query)
                    || issue.description.to_lowercase().contains(&query)
                    || issue.id.to_lowercase().contains(&query)
            });
        }
    }

    pub fn viewport(&self) -> Viewport {
        compute_viewport(&self.filtered_issues)
    }

    pub fn markers(&self) -> Vec<Marker> {
        compute_markers(&self.filtered_issues)
    }

    /// Issue counts per status, known statuses first in workflow order,
    /// then any unknown values alphabetically.
    pub fn status_counts(&self) -> Vec<ChartPoint> {
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();
        let mut points: Vec<ChartPoint> = IssueStatus::KNOWN
            .iter()
            .map(|status| {
                let count = self.filtered_issues.iter().filter(|i| &i.status == status).count();
                ChartPoint::new(status.label(), count as f64)
            })
            .collect();

        for issue in &self.filtered_issues {
            if let IssueStatus::Unknown(raw) = &issue.status {
                *unknown.entry(raw.clone()).or_default() += 1;
            }
        }
        points.extend(unknown.into_iter().map(|(label, count)| ChartPoint::new(label, count as f64)));
        points
    }

    /// Issue counts per category; uncategorised issues are counted as "Other".
    pub fn category_counts(&self) -> Vec<ChartPoint> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for issue in &self.filtered_issues {
            let category = issue
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or("Other");
            *counts.entry(category.to_string()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(label, count)| ChartPoint::new(label, count as f64))
            .collect()
    }
}
