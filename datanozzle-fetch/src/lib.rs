// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # datanozzle fetch
//!
//! Query building and page walking for datagrepper-style message APIs.
//!
//! ## Query Building
//!
//! - [`query::QueryBuilder`] - Immutable, chainable query; iterate it to get entries
//! - [`params::Params`] - Insertion-ordered query parameters
//! - [`query::SortOrder`], [`query::TimeBound`] - Typed arguments for ordering and time windows
//!
//! ## Page Walking
//!
//! - [`pager::EntryStream`] - Lazy iterator that fetches pages one at a time
//!
//! ## Host APIs
//!
//! - [`host::http::Transport`] - The seam between the pager and the network
//! - [`host::http::HttpTransport`] - Blocking reqwest client with tracing and domain allowlist
//!
//! ## Example
//!
//! ```no_run
//! use datanozzle_fetch::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .by_user("sross")
//!     .ascending()
//!     .with_meta(["title", "objects"])
//!     .paginate(5)
//!     .take(2_u32)?;
//!
//! for entry in &query {
//!     let entry = entry?;
//!     println!("{} {}", entry.topic(), entry.timestamp());
//! }
//! # Ok::<(), datanozzle_fetch::FetchError>(())
//! ```

// Core modules
pub mod error;
pub mod host;
pub mod pager;
pub mod params;
pub mod query;

// Re-export key types at crate root

// Errors
pub use error::FetchError;

// Host APIs
pub use host::http::{HttpTransport, Transport, default_transport};

// Query & Pager
pub use pager::EntryStream;
pub use params::{ParamValue, Params};
pub use query::{DEFAULT_BASE_URL, QueryBuilder, SortOrder, TimeBound, resolve_param_name};

// The entry type is part of this crate's API surface.
pub use datanozzle_core::{CoreError, Entry};
