use thiserror::Error;

use super::types::Policy;

/// Pacing delays beyond a day are almost certainly a typo in seconds.
const MAX_DELAY_SECONDS: u64 = 86_400;

/// Error type for policy operations.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid policy: {0}")]
    Validation(String),
}

/// Trait for policy storage backends.
pub trait PolicyStore: Send + Sync {
    /// Load the current policy; returns explicit defaults when none was saved.
    fn load(&self) -> Result<Policy, PolicyError>;

    /// Validate and persist a policy.
    fn save(&self, policy: &Policy) -> Result<(), PolicyError>;
}

/// Validate a policy before it is persisted.
pub(super) fn validate_policy(policy: &Policy) -> Result<(), PolicyError> {
    if policy.delay_seconds > MAX_DELAY_SECONDS {
        return Err(PolicyError::Validation(format!(
            "delay_seconds must be at most {MAX_DELAY_SECONDS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_policy() {
        assert!(validate_policy(&Policy::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_huge_delay() {
        let policy = Policy {
            delay_seconds: MAX_DELAY_SECONDS + 1,
            ..Policy::default()
        };
        let result = validate_policy(&policy);
        assert!(matches!(result, Err(PolicyError::Validation(_))));
    }
}
