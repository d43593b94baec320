//! Domain models for datanozzle.
//!
//! ## Submodules
//!
//! - [`entry`] - A decoded message record and its delivery envelope
//! - [`timestamp`] - Epoch-second conversions shared by entries and queries

pub mod entry;
pub mod timestamp;

pub use entry::Entry;
pub use timestamp::{datetime_from_epoch_secs, epoch_secs_from_datetime, parse_epoch_secs};
#[cfg(test)]
mod serde_tests;
