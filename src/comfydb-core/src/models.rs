use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Document represents a JSON object stored in a database
///
/// The reserved `_id` and `_rev` keys are lifted into their own fields;
/// everything else stays in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Build a document from any JSON object value
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }
}

/// Envelope returned by document mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// DatabaseInfo represents the `GET /{db}/` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub db_name: String,
    pub doc_count: u64,
    pub doc_del_count: u64,
    /// Integer on 1.x servers, opaque string on 2.x and later
    pub update_seq: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<u64>,
    #[serde(default)]
    pub compact_running: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// AllDocs represents the `GET /{db}/_all_docs` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllDocs {
    pub total_rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default)]
    pub rows: Vec<DocRow>,
}

/// DocRow is one row summary of `_all_docs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRow {
    pub id: String,
    pub key: String,
    pub value: RowValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowValue {
    pub rev: String,
}

/// ErrorResponse represents an error body returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
