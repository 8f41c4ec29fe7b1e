//! Core DTE types, code tables, output rows and errors.
//!
//! This module is parser-independent: it defines what an extracted
//! document looks like and how rows are flattened for display and export.

mod codes;
mod error;
mod row;
mod types;

pub use codes::*;
pub use error::*;
pub use row::*;
pub use types::*;
