use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("herald.db")
}

/// How the send button is triggered once the SMS composer is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMethod {
    /// Tap the send button coordinates.
    Tap,
    /// Press Enter on the hardware/IME keyboard.
    Key,
    /// Focus the send button with Tab, then press Enter.
    TabEnter,
}

/// Device automation configuration (adb)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Path to the adb binary.
    #[serde(default = "default_adb_path")]
    pub adb_path: String,
    #[serde(default = "default_send_method")]
    pub send_method: SendMethod,
    /// Screen coordinates of the send button (used by the `tap` method).
    #[serde(default = "default_send_button_x")]
    pub send_button_x: u32,
    #[serde(default = "default_send_button_y")]
    pub send_button_y: u32,
    /// Hard ceiling on any single adb invocation.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Simulated per-send latency in dry-run mode.
    #[serde(default = "default_dry_run_latency")]
    pub dry_run_latency_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            send_method: default_send_method(),
            send_button_x: default_send_button_x(),
            send_button_y: default_send_button_y(),
            command_timeout_secs: default_command_timeout(),
            dry_run_latency_ms: default_dry_run_latency(),
        }
    }
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_send_method() -> SendMethod {
    SendMethod::Tap
}

fn default_send_button_x() -> u32 {
    980
}

fn default_send_button_y() -> u32 {
    1850
}

fn default_command_timeout() -> u64 {
    30
}

fn default_dry_run_latency() -> u64 {
    500
}

/// Event stream configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
    /// Heartbeat interval for idle subscribers.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "herald.db");
        assert_eq!(config.device.adb_path, "adb");
        assert_eq!(config.device.send_method, SendMethod::Tap);
        assert_eq!(config.events.heartbeat_interval_secs, 1);
    }

    #[test]
    fn test_deserialize_custom_server() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_device_section() {
        let toml = r#"
[device]
adb_path = "/opt/platform-tools/adb"
send_method = "tab_enter"
send_button_x = 540
send_button_y = 2200
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.device.adb_path, "/opt/platform-tools/adb");
        assert_eq!(config.device.send_method, SendMethod::TabEnter);
        assert_eq!(config.device.send_button_x, 540);
        assert_eq!(config.device.send_button_y, 2200);
        // Untouched fields keep their defaults
        assert_eq!(config.device.command_timeout_secs, 30);
        assert_eq!(config.device.dry_run_latency_ms, 500);
    }

    #[test]
    fn test_deserialize_with_custom_database_path() {
        let toml = r#"
[database]
path = "/data/herald.sqlite"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/herald.sqlite");
    }

    #[test]
    fn test_deserialize_invalid_send_method_fails() {
        let toml = r#"
[device]
send_method = "swipe"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
