pub mod analytics;
pub mod comment;
pub mod department;
pub mod issue;
pub mod location;
pub mod submission;

// Re-export commonly used types
pub use analytics::{Hotspot, IssuesByTime, ResponseTimes};
pub use comment::Comment;
pub use department::{department_name, Department};
pub use issue::{derive_title, Issue, IssueImage, IssueStatus, IssueUpdate};
pub use location::{Coordinate, LocationCodec, RawLocation};
pub use submission::{PhotoPart, SubmissionPayload};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Backend ids come back as strings from some tables and integers from others.
fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("expected a string or numeric id"))
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(id_from_value))
}

pub(crate) fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
