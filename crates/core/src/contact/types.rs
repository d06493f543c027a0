use serde::{Deserialize, Serialize};

/// A message recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Dense ordinal id; reassigned when earlier contacts are deleted.
    pub id: i64,
    pub phone: String,
    pub name: String,
    /// Per-contact message override; empty means use the policy default.
    #[serde(default)]
    pub message: String,
    pub enabled: bool,
}

/// Payload for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub phone: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Partial update for a contact; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub message: Option<String>,
    pub enabled: Option<bool>,
}

/// Bulk operation over a set of contact ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Enable,
    Disable,
    Delete,
}
