//! Tabular inputs for ruidex.
//!
//! The catalog says what identifiers exist and where their outputs go; the
//! cache listing says which container files hold them; the existence
//! listing says which outputs are already on disk.

mod consts;
pub mod error;
mod listing;
pub mod models;
mod path;
pub mod table;
mod walk;

pub use crate::listing::{Catalog, ExistingFile, Listing, cache_listing, existence_listing, read_catalog};
pub use crate::path::{to_slash, validate as validate_path};
pub use crate::table::{Row, read_table, write_table};
pub use crate::walk::walk_files;
