//! Test doubles and fixtures shared by unit and integration tests.

pub mod fixtures;
mod mock_driver;

pub use mock_driver::{MockDriver, RecordedSend};
