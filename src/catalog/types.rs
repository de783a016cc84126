//! Relation kinds for pgmeta
//!
//! This module defines the closed set of relation kinds the describe engine
//! branches on, and the per-call reference to a resolved catalog object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a `pg_class` relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelKind {
    /// Ordinary table (`r`)
    Table,
    /// Partitioned table (`p`)
    PartitionedTable,
    /// View (`v`)
    View,
    /// Materialized view (`m`)
    MaterializedView,
    /// Index (`i`)
    Index,
    /// Partitioned index (`I`)
    PartitionedIndex,
    /// Sequence (`S`)
    Sequence,
    /// Foreign table (`f`)
    ForeignTable,
    /// Composite type (`c`)
    CompositeType,
    /// TOAST table (`t`)
    Toast,
    /// Any code this crate does not know about
    Other(char),
}

impl RelKind {
    /// Map a `relkind` catalog code
    pub fn from_code(code: char) -> Self {
        match code {
            'r' => RelKind::Table,
            'p' => RelKind::PartitionedTable,
            'v' => RelKind::View,
            'm' => RelKind::MaterializedView,
            'i' => RelKind::Index,
            'I' => RelKind::PartitionedIndex,
            'S' => RelKind::Sequence,
            'f' => RelKind::ForeignTable,
            'c' => RelKind::CompositeType,
            't' => RelKind::Toast,
            other => RelKind::Other(other),
        }
    }

    /// Map a `relkind::text` value; empty text maps to `Other('\0')`
    pub fn from_code_str(code: &str) -> Self {
        code.chars()
            .next()
            .map(Self::from_code)
            .unwrap_or(RelKind::Other('\0'))
    }

    /// The catalog code
    pub fn code(self) -> char {
        match self {
            RelKind::Table => 'r',
            RelKind::PartitionedTable => 'p',
            RelKind::View => 'v',
            RelKind::MaterializedView => 'm',
            RelKind::Index => 'i',
            RelKind::PartitionedIndex => 'I',
            RelKind::Sequence => 'S',
            RelKind::ForeignTable => 'f',
            RelKind::CompositeType => 'c',
            RelKind::Toast => 't',
            RelKind::Other(c) => c,
        }
    }

    /// Human readable name, as listed by `\d`
    pub fn label(self) -> &'static str {
        match self {
            RelKind::Table => "table",
            RelKind::PartitionedTable => "partitioned table",
            RelKind::View => "view",
            RelKind::MaterializedView => "materialized view",
            RelKind::Index => "index",
            RelKind::PartitionedIndex => "partitioned index",
            RelKind::Sequence => "sequence",
            RelKind::ForeignTable => "foreign table",
            RelKind::CompositeType => "composite type",
            RelKind::Toast => "TOAST table",
            RelKind::Other(_) => "special",
        }
    }

    /// Kinds whose columns carry collation/not-null/default/identity modifiers
    pub fn has_modifiers(self) -> bool {
        match self {
            RelKind::Table
            | RelKind::PartitionedTable
            | RelKind::View
            | RelKind::MaterializedView
            | RelKind::ForeignTable
            | RelKind::CompositeType => true,
            RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Index kinds
    pub fn is_index(self) -> bool {
        match self {
            RelKind::Index | RelKind::PartitionedIndex => true,
            RelKind::Table
            | RelKind::PartitionedTable
            | RelKind::View
            | RelKind::MaterializedView
            | RelKind::Sequence
            | RelKind::ForeignTable
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Views whose definition can be shown
    pub fn is_view(self) -> bool {
        match self {
            RelKind::View | RelKind::MaterializedView => true,
            RelKind::Table
            | RelKind::PartitionedTable
            | RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::ForeignTable
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Base relations: the kinds with indexes, constraints, rules and partitions
    pub fn is_base_relation(self) -> bool {
        match self {
            RelKind::Table
            | RelKind::PartitionedTable
            | RelKind::MaterializedView
            | RelKind::ForeignTable => true,
            RelKind::View
            | RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Kinds that take part in table inheritance listings
    pub fn shows_inheritance(self) -> bool {
        match self {
            RelKind::Table | RelKind::MaterializedView | RelKind::ForeignTable => true,
            RelKind::PartitionedTable
            | RelKind::View
            | RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Kinds with a verbose `Stats target` column
    pub fn has_stats_target(self) -> bool {
        match self {
            RelKind::Table | RelKind::MaterializedView | RelKind::ForeignTable => true,
            RelKind::PartitionedTable
            | RelKind::View
            | RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }

    /// Kinds with a verbose `Description` column
    pub fn has_description(self) -> bool {
        match self {
            RelKind::Table
            | RelKind::View
            | RelKind::MaterializedView
            | RelKind::CompositeType
            | RelKind::ForeignTable => true,
            RelKind::PartitionedTable
            | RelKind::Index
            | RelKind::PartitionedIndex
            | RelKind::Sequence
            | RelKind::Toast
            | RelKind::Other(_) => false,
        }
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A catalog object matched by a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogObjectRef {
    /// Object identifier
    pub oid: u32,
    /// Schema name
    pub schema: String,
    /// Relation name
    pub name: String,
    /// Relation kind
    pub kind: RelKind,
}

impl CatalogObjectRef {
    /// Create a new object reference
    pub fn new(oid: u32, schema: impl Into<String>, name: impl Into<String>, kind: RelKind) -> Self {
        Self {
            oid,
            schema: schema.into(),
            name: name.into(),
            kind,
        }
    }

    /// `schema.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}
