//! adb-backed device driver.
//!
//! Drives the stock SMS composer: an SENDTO intent opens it with the
//! recipient and body prefilled, then the configured send method presses
//! the send button. The composer is stateful, so calls must never overlap;
//! the dispatcher guarantees one send at a time.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::{DeviceConfig, SendMethod};

use super::{DeviceDriver, DeviceError, DeviceStatus, SendOutcome};

const KEYCODE_HOME: u32 = 3;
const KEYCODE_TAB: u32 = 61;
const KEYCODE_ENTER: u32 = 66;

/// Wait for the composer activity to come up after the intent.
const COMPOSER_LAUNCH_WAIT: Duration = Duration::from_secs(3);
/// Wait between the two taps (second tap clears a confirmation dialog).
const CONFIRM_TAP_WAIT: Duration = Duration::from_secs(1);
/// Wait between repeated Enter presses.
const KEY_REPEAT_WAIT: Duration = Duration::from_millis(500);
/// Wait between Tab focus steps.
const TAB_STEP_WAIT: Duration = Duration::from_millis(300);
/// Wait for the message to actually leave before moving on.
const SEND_SETTLE_WAIT: Duration = Duration::from_secs(2);

struct AdbOutput {
    ok: bool,
    stdout: String,
    stderr: String,
}

/// Device driver that shells out to the adb binary.
pub struct AdbDriver {
    config: DeviceConfig,
}

impl AdbDriver {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }

    async fn run(&self, args: &[&str]) -> Result<AdbOutput, DeviceError> {
        debug!(adb = %self.config.adb_path, ?args, "running adb command");
        let output = Command::new(&self.config.adb_path).args(args).output();
        let output = timeout(
            Duration::from_secs(self.config.command_timeout_secs),
            output,
        )
        .await
        .map_err(|_| DeviceError::Timeout(self.config.command_timeout_secs))?
        .map_err(|e| DeviceError::Spawn(e.to_string()))?;

        Ok(AdbOutput {
            ok: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn keyevent(&self, code: u32) -> Result<AdbOutput, DeviceError> {
        self.run(&["shell", "input", "keyevent", &code.to_string()])
            .await
    }

    /// Press the send button using the configured method.
    async fn trigger_send(&self) -> Result<(), DeviceError> {
        match self.config.send_method {
            SendMethod::Tap => {
                let x = self.config.send_button_x.to_string();
                let y = self.config.send_button_y.to_string();
                self.run(&["shell", "input", "tap", &x, &y]).await?;
                sleep(CONFIRM_TAP_WAIT).await;
                self.run(&["shell", "input", "tap", &x, &y]).await?;
            }
            SendMethod::Key => {
                self.keyevent(KEYCODE_ENTER).await?;
                sleep(KEY_REPEAT_WAIT).await;
                self.keyevent(KEYCODE_ENTER).await?;
            }
            SendMethod::TabEnter => {
                self.keyevent(KEYCODE_TAB).await?;
                sleep(TAB_STEP_WAIT).await;
                self.keyevent(KEYCODE_TAB).await?;
                sleep(TAB_STEP_WAIT).await;
                self.keyevent(KEYCODE_ENTER).await?;
            }
        }
        Ok(())
    }
}

/// Quote a string for the shell that `adb shell` spawns on the device.
fn device_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Parse `wm size` output of the form "Physical size: 1080x2400".
fn parse_physical_size(stdout: &str) -> Option<(u32, u32)> {
    let size = stdout.split("Physical size:").nth(1)?.trim();
    let (width, height) = size.split_once('x')?;
    Some((
        width.trim().parse().ok()?,
        height.trim().lines().next()?.trim().parse().ok()?,
    ))
}

#[async_trait]
impl DeviceDriver for AdbDriver {
    fn name(&self) -> &str {
        "adb"
    }

    async fn send(&self, phone: &str, message: &str, dry_run: bool) -> SendOutcome {
        if dry_run {
            sleep(Duration::from_millis(self.config.dry_run_latency_ms)).await;
            return SendOutcome::ok("dry run");
        }

        let uri = format!("sms:{phone}");
        let body = device_quote(message);
        let launch = self
            .run(&[
                "shell",
                "am",
                "start",
                "-a",
                "android.intent.action.SENDTO",
                "-d",
                &uri,
                "--es",
                "sms_body",
                &body,
            ])
            .await;
        match launch {
            Ok(out) if out.ok => {}
            Ok(out) => {
                return SendOutcome::failed(format!(
                    "composer launch failed: {}",
                    out.stderr.trim()
                ));
            }
            Err(e) => return SendOutcome::failed(format!("composer launch failed: {e}")),
        }

        sleep(COMPOSER_LAUNCH_WAIT).await;

        if let Err(e) = self.trigger_send().await {
            return SendOutcome::failed(format!("send trigger failed: {e}"));
        }

        sleep(SEND_SETTLE_WAIT).await;

        // Back to the launcher so the next intent starts from a known screen.
        if let Err(e) = self.keyevent(KEYCODE_HOME).await {
            warn!("failed to return to home screen: {e}");
        }

        SendOutcome::ok("sent")
    }

    async fn check(&self) -> Result<DeviceStatus, DeviceError> {
        let out = self.run(&["devices"]).await?;
        if !out.ok {
            return Ok(DeviceStatus {
                connected: false,
                device_id: None,
                detail: format!("adb not runnable: {}", out.stderr.trim()),
            });
        }

        let device_id = out
            .stdout
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .find(|line| line.contains("device"))
            .and_then(|line| line.split_whitespace().next())
            .map(String::from);

        Ok(match device_id {
            Some(id) => DeviceStatus {
                connected: true,
                detail: format!("connected: {id}"),
                device_id: Some(id),
            },
            None => DeviceStatus {
                connected: false,
                device_id: None,
                detail: "no device attached".to_string(),
            },
        })
    }

    async fn tap(&self, x: u32, y: u32) -> Result<(), DeviceError> {
        let out = self
            .run(&["shell", "input", "tap", &x.to_string(), &y.to_string()])
            .await?;
        if !out.ok {
            return Err(DeviceError::Command(out.stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn screen_size(&self) -> Result<(u32, u32), DeviceError> {
        let out = self.run(&["shell", "wm", "size"]).await?;
        if !out.ok {
            return Err(DeviceError::Command(out.stderr.trim().to_string()));
        }
        parse_physical_size(&out.stdout)
            .ok_or_else(|| DeviceError::Parse(out.stdout.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_quote_plain() {
        assert_eq!(device_quote("hello world"), "'hello world'");
    }

    #[test]
    fn test_device_quote_single_quote() {
        assert_eq!(device_quote("it's here"), r"'it'\''s here'");
    }

    #[test]
    fn test_device_quote_double_quote_passthrough() {
        assert_eq!(device_quote(r#"say "hi""#), r#"'say "hi"'"#);
    }

    #[test]
    fn test_parse_physical_size() {
        assert_eq!(
            parse_physical_size("Physical size: 1080x2400\n"),
            Some((1080, 2400))
        );
    }

    #[test]
    fn test_parse_physical_size_garbage() {
        assert_eq!(parse_physical_size("no size here"), None);
        assert_eq!(parse_physical_size("Physical size: bogus"), None);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_touch_adb() {
        // Nonexistent binary: a real send would fail to spawn, dry-run must not.
        let driver = AdbDriver::new(DeviceConfig {
            adb_path: "/nonexistent/adb".to_string(),
            dry_run_latency_ms: 1,
            ..DeviceConfig::default()
        });
        let outcome = driver.send("+815011110001", "hello", true).await;
        assert!(outcome.success);
        assert_eq!(outcome.detail, "dry run");
    }

    #[tokio::test]
    async fn test_send_reports_spawn_failure() {
        let driver = AdbDriver::new(DeviceConfig {
            adb_path: "/nonexistent/adb".to_string(),
            ..DeviceConfig::default()
        });
        let outcome = driver.send("+815011110001", "hello", false).await;
        assert!(!outcome.success);
        assert!(outcome.detail.contains("composer launch failed"));
    }
}
