//! Types for device driver operations.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("adb could not be started: {0}")]
    Spawn(String),

    #[error("adb command timed out after {0}s")]
    Timeout(u64),

    #[error("adb command failed: {0}")]
    Command(String),

    #[error("unexpected adb output: {0}")]
    Parse(String),
}

/// Outcome of one send attempt.
///
/// Sending never errors past the driver boundary: any failure is reported
/// as `success == false` with a diagnostic detail.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub detail: String,
}

impl SendOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// Connection state of the automation target.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub detail: String,
}

/// Trait for device automation backends.
#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Backend name for logging and status output.
    fn name(&self) -> &str;

    /// Attempt one send. Bounded in time; never panics or errors through.
    /// In dry-run mode no device interaction happens, but the call sleeps a
    /// comparable latency so pacing behaves like a real run.
    async fn send(&self, phone: &str, message: &str, dry_run: bool) -> SendOutcome;

    /// Check whether a device is attached and responsive.
    async fn check(&self) -> Result<DeviceStatus, DeviceError>;

    /// Tap the screen at the given coordinates (send-button calibration).
    async fn tap(&self, x: u32, y: u32) -> Result<(), DeviceError>;

    /// Physical screen size as (width, height).
    async fn screen_size(&self) -> Result<(u32, u32), DeviceError>;
}
