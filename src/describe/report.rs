//! Describe report model
//!
//! A [`DescribeReport`] is the column grid plus the footer sections for one
//! described relation.

use serde::Serialize;

use crate::catalog::RelKind;
use crate::error::{Error, Result};

/// Firing mode of a rule or trigger (`ev_enabled` / `tgenabled`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringMode {
    /// Fires in origin and local modes (`O`)
    Enabled,
    /// Disabled (`D`)
    Disabled,
    /// Fires always (`A`)
    Always,
    /// Fires on replicas only (`R`)
    Replica,
}

impl FiringMode {
    /// Map the catalog code; unknown codes are ignored by callers
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "O" => Some(FiringMode::Enabled),
            "D" => Some(FiringMode::Disabled),
            "A" => Some(FiringMode::Always),
            "R" => Some(FiringMode::Replica),
            _ => None,
        }
    }
}

/// Entries grouped by firing mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FiringGroups {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub always: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replica: Vec<String>,
}

impl FiringGroups {
    /// File `entry` under `mode`
    pub fn push(&mut self, mode: FiringMode, entry: String) {
        match mode {
            FiringMode::Enabled => self.enabled.push(entry),
            FiringMode::Disabled => self.disabled.push(entry),
            FiringMode::Always => self.always.push(entry),
            FiringMode::Replica => self.replica.push(entry),
        }
    }

    /// No entries in any group
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
            && self.disabled.is_empty()
            && self.always.is_empty()
            && self.replica.is_empty()
    }

    /// Total entries across groups
    pub fn len(&self) -> usize {
        self.enabled.len() + self.disabled.len() + self.always.len() + self.replica.len()
    }
}

/// Named footer blocks; each is present only when it applies and is non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FooterSections {
    /// Index summary line (`primary key, btree, for table "public.t"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub check_constraints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub referenced_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_definition: Option<String>,
    #[serde(skip_serializing_if = "FiringGroups::is_empty")]
    pub rules: FiringGroups,
    #[serde(skip_serializing_if = "FiringGroups::is_empty")]
    pub triggers: FiringGroups,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_of: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_constraints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions_summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_tables_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_table_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fdw_options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

impl FooterSections {
    /// Present sections as `(heading, lines)` in display order
    pub fn blocks(&self) -> Vec<(&'static str, Vec<String>)> {
        let mut out: Vec<(&'static str, Vec<String>)> = Vec::new();
        let mut list = |title: &'static str, lines: &[String]| {
            if !lines.is_empty() {
                out.push((title, lines.to_vec()));
            }
        };

        list("Index", opt(&self.index_summary).as_slice());
        list("Owned by", opt(&self.owned_by).as_slice());
        list("View definition", opt(&self.view_definition).as_slice());
        list("Partition of", &self.partition_of);
        list("Partition constraint", &self.partition_constraints);
        list("Partition key", opt(&self.partition_key).as_slice());
        list("Indexes", &self.indexes);
        list("Check constraints", &self.check_constraints);
        list("Foreign-key constraints", &self.foreign_keys);
        list("Referenced by", &self.referenced_by);
        list("Rules", &self.rules.enabled);
        list("Disabled rules", &self.rules.disabled);
        list("Rules firing always", &self.rules.always);
        list("Rules firing on replica only", &self.rules.replica);
        list("Triggers", &self.triggers.enabled);
        list("Disabled triggers", &self.triggers.disabled);
        list("Triggers firing always", &self.triggers.always);
        list("Triggers firing on replica only", &self.triggers.replica);
        list("Server", opt(&self.server).as_slice());
        list("FDW options", opt(&self.fdw_options).as_slice());
        list("Inherits", &self.inherits);
        list("Partitions", &self.partitions);
        list("Partitions", opt(&self.partitions_summary).as_slice());
        list("Child tables", &self.child_tables);
        list("Child tables", opt(&self.child_tables_summary).as_slice());
        list("Typed table of type", opt(&self.typed_table_of).as_slice());
        list("Options", opt(&self.options).as_slice());
        out
    }

    /// Headings of the present sections
    pub fn section_names(&self) -> Vec<&'static str> {
        self.blocks().into_iter().map(|(name, _)| name).collect()
    }
}

fn opt(value: &Option<String>) -> Vec<String> {
    value.iter().cloned().collect()
}

/// Description of one relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeReport {
    /// Schema of the described relation
    pub schema: String,
    /// Name of the described relation
    pub name: String,
    /// Kind of the described relation
    pub kind: RelKind,
    /// Ordered column headers
    pub column_headers: Vec<String>,
    /// Ordered rows, each as long as `column_headers`
    pub rows: Vec<Vec<String>>,
    /// Footer sections
    pub footer: FooterSections,
}

impl DescribeReport {
    /// Create an empty report with the given headers
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        kind: RelKind,
        column_headers: Vec<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
            column_headers,
            rows: Vec::new(),
            footer: FooterSections::default(),
        }
    }

    /// Append a row, enforcing the header width
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.column_headers.len() {
            return Err(Error::Internal(format!(
                "describe row has {} cells but {} headers",
                row.len(),
                self.column_headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Title line, e.g. `Table "public.users"`
    pub fn title(&self) -> String {
        let mut kind = self.kind.label().to_string();
        if let Some(first) = kind.get(0..1) {
            kind = first.to_uppercase() + &kind[1..];
        }
        format!("{} \"{}.{}\"", kind, self.schema, self.name)
    }

    /// Values of the named column, top to bottom
    pub fn column_values(&self, header: &str) -> Option<Vec<&str>> {
        let idx = self.column_headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}
