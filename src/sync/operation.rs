use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ListId = i64;
pub type UserId = i64;

/// Locally generated correlation key for an Add the server has not seen yet.
///
/// Format: `temp_<epoch-ms>_<9 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(String);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl TempId {
    pub fn generate(now_ms: i64) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..9)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("temp_{now_ms}_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TempId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TempId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target of a delete: a pending local item or a server-confirmed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Temporary(TempId),
    Server(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPayload {
    pub item_name: String,
    pub category: String,
    pub list_id: ListId,
    pub added_by_id: UserId,
    pub temp_id: TempId,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub item_id: i64,
    pub list_id: ListId,
    pub timestamp: i64,
}

/// One mutation waiting to be confirmed by the server.
///
/// Persisted as `{"type": "add" | "delete", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum QueuedOperation {
    Add(AddPayload),
    Delete(DeletePayload),
}

impl QueuedOperation {
    pub fn timestamp(&self) -> i64 {
        match self {
            QueuedOperation::Add(p) => p.timestamp,
            QueuedOperation::Delete(p) => p.timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueuedOperation::Add(_) => "add",
            QueuedOperation::Delete(_) => "delete",
        }
    }

    /// True if this is the Add that created `temp_id`.
    pub fn is_add_for(&self, temp_id: &TempId) -> bool {
        matches!(self, QueuedOperation::Add(p) if &p.temp_id == temp_id)
    }
}
