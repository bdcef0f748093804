//! Arrlink-Common: types shared by every arrlink client.
//!
//! - **Error Handling**: the error taxonomy surfaced by all remote calls
//! - **Dialect**: the API generation a server speaks, and every path or
//!   field-name decision that depends on it
//!
//! # Examples
//!
//! ```
//! use arrlink_common::{Dialect, Error, Result};
//!
//! let dialect = Dialect::classify("3.0.10.1567", false).unwrap();
//! assert_eq!(dialect.prefix(), "/api/v3");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("movie 42"))
//! }
//! assert!(example().is_err());
//! ```

pub mod dialect;
pub mod error;

pub use dialect::Dialect;
pub use error::{Error, Result};
