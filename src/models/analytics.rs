use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IssuesByTime {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseTimes {
    pub average_hours: Option<f64>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Hotspot {
    pub lat: f64,
    pub lon: f64,
    pub count: u64,
}
