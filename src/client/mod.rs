pub mod api;
pub mod civic_client;

pub use api::{IssueApi, IssueQuery};
pub use civic_client::{check_response, decode_list, extract_detail, CivicClient};
