use serde::{Deserialize, Serialize};

use super::string_or_number;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Department {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Name for a department id, falling back to the raw id when it is not in the list.
pub fn department_name<'a>(departments: &'a [Department], id: Option<&'a str>) -> &'a str {
    match id {
        None => "Unassigned",
        Some(id) => departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.as_str())
            .unwrap_or(id),
    }
}
