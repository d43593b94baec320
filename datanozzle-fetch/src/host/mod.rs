//! Host APIs for talking to the outside world.
//!
//! - [`http`] - The [`Transport`](http::Transport) seam and its reqwest-backed implementation

pub mod http;
