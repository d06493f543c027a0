//! Mock device driver for testing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::device::{DeviceDriver, DeviceError, DeviceStatus, SendOutcome};

/// A recorded send attempt for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub phone: String,
    pub message: String,
    pub dry_run: bool,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of the DeviceDriver trait.
///
/// Provides controllable behavior for testing:
/// - Track send attempts for assertions
/// - Inject per-phone failures
/// - Simulate per-send latency
///
/// # Example
///
/// ```rust,ignore
/// let driver = MockDriver::new();
/// driver.fail_phone("+815011110002").await;
/// driver.set_latency(Duration::from_millis(50)).await;
///
/// let outcome = driver.send("+815011110001", "hello", false).await;
/// assert!(outcome.success);
///
/// let sends = driver.recorded_sends().await;
/// assert_eq!(sends.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockDriver {
    sends: Arc<RwLock<Vec<RecordedSend>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    latency: Arc<RwLock<Duration>>,
    connected: Arc<RwLock<bool>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a new mock driver: instant sends, everything succeeds.
    pub fn new() -> Self {
        Self {
            sends: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            connected: Arc::new(RwLock::new(true)),
        }
    }

    /// All recorded send attempts, in call order.
    pub async fn recorded_sends(&self) -> Vec<RecordedSend> {
        self.sends.read().await.clone()
    }

    /// Number of non-dry-run send attempts.
    pub async fn real_send_count(&self) -> usize {
        self.sends.read().await.iter().filter(|s| !s.dry_run).count()
    }

    /// Clear recorded sends.
    pub async fn clear_recorded(&self) {
        self.sends.write().await.clear();
    }

    /// Make every send to `phone` fail.
    pub async fn fail_phone(&self, phone: &str) {
        self.failing.write().await.insert(phone.to_string());
    }

    /// Simulated duration of each send.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Toggle the simulated device connection.
    pub async fn set_connected(&self, connected: bool) {
        *self.connected.write().await = connected;
    }
}

#[async_trait]
impl DeviceDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, phone: &str, message: &str, dry_run: bool) -> SendOutcome {
        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.sends.write().await.push(RecordedSend {
            phone: phone.to_string(),
            message: message.to_string(),
            dry_run,
            timestamp: Utc::now(),
        });

        if self.failing.read().await.contains(phone) {
            return SendOutcome::failed("injected failure");
        }
        if dry_run {
            SendOutcome::ok("dry run")
        } else {
            SendOutcome::ok("sent")
        }
    }

    async fn check(&self) -> Result<DeviceStatus, DeviceError> {
        let connected = *self.connected.read().await;
        Ok(DeviceStatus {
            connected,
            device_id: connected.then(|| "mock-device-01".to_string()),
            detail: if connected {
                "connected: mock-device-01".to_string()
            } else {
                "no device attached".to_string()
            },
        })
    }

    async fn tap(&self, _x: u32, _y: u32) -> Result<(), DeviceError> {
        Ok(())
    }

    async fn screen_size(&self) -> Result<(u32, u32), DeviceError> {
        Ok((1080, 2400))
    }
}
