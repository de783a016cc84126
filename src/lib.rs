//! pgmeta - psql-style meta-commands answered from the PostgreSQL catalog
//!
//! This library provides:
//! - Pattern compilation for `schema.name` wildcard patterns
//! - A typed catalog query layer over any [`query::Queryer`]
//! - Relation resolution and the `\d` describe engine
//! - The command registry, dispatcher and built-in list commands
//! - Client configuration

pub mod catalog;
pub mod command;
pub mod commands;
pub mod config;
pub mod describe;
pub mod error;
pub mod pattern;
pub mod query;

pub use error::{Error, Result};
