//! Catalog module
//!
//! This module contains the relation kinds and the resolver that maps
//! patterns onto catalog objects.

pub mod resolver;
pub mod types;

pub use resolver::{resolve, resolve_required};
pub use types::{CatalogObjectRef, RelKind};
