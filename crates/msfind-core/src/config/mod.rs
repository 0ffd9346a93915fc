//! Configuration system for msfind
//!
//! A run is configured by a single file naming the packages to scan and the
//! package cache to resolve them from. JSON, TOML and YAML are accepted.
//!
//! ## Configuration Discovery
//!
//! When no explicit config path is given, the loader searches the current
//! directory and its parents for `config/config.json`, `msfind.json`,
//! `msfind.toml`, `msfind.yaml` and `msfind.yml`, in that order.
//!
//! ## Example Configuration (msfind.toml)
//!
//! ```toml
//! fhir-package-cache = "~/.fhir/packages"
//!
//! [[init]]
//! mode = "clean"
//!
//! [[packages]]
//! name = "hl7.fhir.au.core"
//! version = "current"
//! title = "AU Core"
//! ```

mod loader;
mod msfind_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use msfind_config::{InitSettings, MsFindConfig, RunMode};
