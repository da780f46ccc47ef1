//! Core definitions (error types and result helpers), relied upon by all atomview-* crates.

pub mod error;
pub mod result;

pub use error::{Error, ErrorClass, ErrorKind};
pub use result::Result;
