// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # datanozzle store
//!
//! Persistent client configuration.
//!
//! - **Config**: API root, timeout, default page size and domain allowlist
//! - **Persistence**: JSON file helpers and default paths
//!
//! ## Usage
//!
//! ```no_run
//! use datanozzle_store::Config;
//!
//! let config = Config::load()?;
//! let query = config.query()?.by_user("sross");
//! # Ok::<(), datanozzle_store::StoreError>(())
//! ```

pub mod config;
pub mod error;
pub mod persistence;

pub use config::Config;
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_config_path, load_json, save_json,
};
#[cfg(test)]
mod persistence_tests;
