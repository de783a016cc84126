//! Results returned by meta-command handlers

use serde::Serialize;

use crate::describe::DescribeReport;
use crate::query::QueryResult;

/// Dependent objects of one extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescription {
    pub name: String,
    /// `pg_describe_object` text of each member, in catalog order
    pub objects: Vec<String>,
}

/// Discriminant of a [`SpecialResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultKind {
    Rows,
    DescribeTable,
    ExtensionVerbose,
}

/// Outcome of a meta-command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum SpecialResult {
    /// Column names plus materialized rows
    Rows(QueryResult),
    /// One report per matched relation
    DescribeTable(Vec<DescribeReport>),
    /// One entry per matched extension
    ExtensionVerbose(Vec<ExtensionDescription>),
}

impl SpecialResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            SpecialResult::Rows(_) => ResultKind::Rows,
            SpecialResult::DescribeTable(_) => ResultKind::DescribeTable,
            SpecialResult::ExtensionVerbose(_) => ResultKind::ExtensionVerbose,
        }
    }

    /// The rows, when this is a `Rows` result
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            SpecialResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// The reports, when this is a `DescribeTable` result
    pub fn reports(&self) -> Option<&[DescribeReport]> {
        match self {
            SpecialResult::DescribeTable(reports) => Some(reports),
            _ => None,
        }
    }
}
