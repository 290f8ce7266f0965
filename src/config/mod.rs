//! Monitor Configuration Module
//!
//! Provides configuration loaded from TOML files, covering the device-cloud
//! endpoint, telemetry paging, recommendation cooldown and storage paths.
//!
//! ## Loading Order
//!
//! 1. `GROWMONITOR_CONFIG` environment variable (path to TOML file)
//! 2. `growmonitor.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Device-cloud credentials are then overridden by `GROWMONITOR_CLIENT_ID`
//! and `GROWMONITOR_ACCESS_TOKEN` when set.

mod monitor_config;
pub mod defaults;
pub mod validation;

pub use monitor_config::*;
