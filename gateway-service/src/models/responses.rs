use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

/// A single book as returned to clients. Every key is always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub books: Vec<BookRecord>,
    pub definition: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SearchResponse {
    pub fn new(books: Vec<BookRecord>, definition: Vec<String>) -> Self {
        Self {
            books,
            definition,
            warning: None,
        }
    }

    /// Empty result handed out when the aggregation itself blew up.
    pub fn fallback(warning: &str) -> Self {
        Self {
            books: Vec::new(),
            definition: Vec::new(),
            warning: Some(warning.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
