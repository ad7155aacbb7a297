//! Readers for NASA Planetary Data System (PDS) index tables.
//!
//! An index is a fixed-width text table whose layout lives in a separate
//! PDS3 label. [`IndexLabel`] turns the label into column names and byte
//! ranges (expanding array columns into `NAME_1..NAME_n`), and the
//! [`table`] reader slices the paired data file into a [`Table`], optionally
//! converting time columns to timestamps.

pub mod config;
pub mod error;
pub mod label;
pub mod repair;
pub mod table;
pub mod time;
pub mod urls;

pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use label::{ColumnDescriptor, ColumnSpec, Decoded, IndexLabel};
pub use table::{ReadOptions, Table, Value};
