//! Result page models for message and record searches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which result collection of a job is paged.
///
/// Messages are raw log lines; records are rows produced by aggregate
/// operators in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultKind {
    #[default]
    Messages,
    Records,
}

impl ResultKind {
    /// Path segment of the results endpoint, which is also the JSON array name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Records => "records",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column description returned alongside each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub key_field: bool,
}

/// A single message or record. Values are kept as the service sends them
/// (mostly strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    pub map: Map<String, Value>,
}

impl ResultItem {
    /// Look up a field value as a string slice.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.map.get(field).and_then(Value::as_str)
    }
}

/// One window of a job's accumulated output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsPage {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(alias = "messages", alias = "records", default)]
    pub items: Vec<ResultItem>,
}

impl ResultsPage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
