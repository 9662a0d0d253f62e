use serde::{Deserialize, Serialize};

/// Key of the preference document listing known client organisations.
pub const ORGANISATIONS: &str = "organisations";

/// A named, free-form preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub id: String,
    pub value: serde_json::Value,
}

impl Preference {
    /// String entries of an array value; anything else is skipped.
    pub fn string_list(&self) -> Vec<String> {
        match &self.value {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
