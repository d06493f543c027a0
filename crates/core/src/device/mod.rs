//! Device automation abstraction.
//!
//! This module provides a `DeviceDriver` trait for pushing a message out
//! through a handset, plus the adb-backed implementation.

mod adb;
mod types;

pub use adb::AdbDriver;
pub use types::*;
