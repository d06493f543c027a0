use serde::{Deserialize, Serialize};

/// Campaign policy, read once at the start of each dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Message used for contacts without a per-contact override.
    #[serde(default = "default_message")]
    pub default_message: String,
    /// Pacing delay between consecutive sends.
    #[serde(default = "default_delay")]
    pub delay_seconds: u64,
    /// Whether runs default to dry-run mode when the caller does not say.
    #[serde(default)]
    pub dry_run: bool,
    /// Maximum successful sends per calendar day; 0 means unlimited.
    #[serde(default)]
    pub daily_quota: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            default_message: default_message(),
            delay_seconds: default_delay(),
            dry_run: false,
            daily_quota: 0,
        }
    }
}

fn default_message() -> String {
    "This is a reminder message.".to_string()
}

fn default_delay() -> u64 {
    5
}
