//! OSRM HTTP routing backend.
//!
//! Response parsing is always compiled; the blocking HTTP client needs the
//! `osrm` feature.

#[cfg(feature = "osrm")]
mod client;
mod error;
#[cfg_attr(not(feature = "osrm"), allow(dead_code))]
mod parser;
#[cfg_attr(not(feature = "osrm"), allow(dead_code))]
mod response;

#[cfg(feature = "osrm")]
pub use client::OsrmClient;
pub use error::OsrmError;
