// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # datanozzle core
//!
//! The message model shared by the other `datanozzle` crates.
//!
//! - [`Entry`] - One decoded `raw_messages` record: message body plus envelope
//! - [`CoreError`] - Decoding and lookup failures
//! - Epoch-second helpers used by both entries and query time bounds
//!
//! ## Example
//!
//! ```
//! use datanozzle_core::Entry;
//! use serde_json::json;
//!
//! let entry = Entry::from_value(json!({
//!     "certificate": "C",
//!     "signature": "S",
//!     "i": 1,
//!     "timestamp": "1370967851",
//!     "topic": "org.fedoraproject.prod.fas.user.create",
//!     "msg": {"user": "sross"}
//! }))
//! .unwrap();
//!
//! assert_eq!(entry.get("user").unwrap(), "sross");
//! ```

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    Entry, datetime_from_epoch_secs, epoch_secs_from_datetime, parse_epoch_secs,
};
