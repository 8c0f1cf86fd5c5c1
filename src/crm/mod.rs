//! Destination board: API seam, schema types and column handling.

pub mod columns;
pub mod encode;
pub mod monday;

use serde::Deserialize;
use thiserror::Error;

pub use columns::{ColumnMap, ColumnRole, ColumnType, MappedColumn};

/// Why a single board call failed. Never fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmFault {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected by board api: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl BoardColumn {
    pub fn new(id: &str, title: &str, kind: ColumnType) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardGroup {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoardSchema {
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
    #[serde(default)]
    pub groups: Vec<BoardGroup>,
}

/// Where items land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTarget {
    pub board_id: u64,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItem {
    pub board_id: u64,
    pub group_id: Option<String>,
    pub item_name: String,
    /// Serialized column-id → value map; `None` sends the name only.
    pub column_values: Option<String>,
}

#[async_trait::async_trait]
pub trait BoardApi: Send + Sync {
    async fn fetch_schema(&self, board_id: u64) -> Result<BoardSchema, CrmFault>;

    /// Returns the new item id.
    async fn create_item(&self, req: &CreateItem) -> Result<String, CrmFault>;

    /// Attach a free-text update to an item. Returns the update id.
    async fn create_update(&self, item_id: &str, body: &str) -> Result<String, CrmFault>;
}
