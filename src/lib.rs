//! arrlink - client library for Radarr, Sonarr, Lidarr and Readarr
//!
//! The request layer negotiates each server's API dialect once, the model
//! loads entities lazily, and the batch reconciler partitions bulk
//! operations into processed, existing and invalid items.

pub mod arr;
pub mod config;
pub mod model;

pub use arrlink_common::{Dialect, Error, Result};
