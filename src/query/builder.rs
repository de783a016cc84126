//! Typed catalog query builder
//!
//! A query is an ordered list of SQL fragments plus the parameters bound to
//! them. Placeholders are numbered when a parameter is pushed, so branches can
//! be added, removed or reordered without hand-maintained `$n` indices.

use std::fmt;

use super::value::Value;

/// A labelled, parameterized catalog query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    label: &'static str,
    fragments: Vec<String>,
    params: Vec<Value>,
}

impl Query {
    /// Start a new query. `label` names it in logs and errors.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            fragments: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Start a new query from a single static statement
    pub fn text(label: &'static str, sql: impl Into<String>) -> Self {
        Self::new(label).push(sql)
    }

    /// Append a SQL fragment
    pub fn push(mut self, sql: impl Into<String>) -> Self {
        self.fragments.push(sql.into());
        self
    }

    /// Append a SQL fragment only when `cond` holds
    pub fn push_if(self, cond: bool, sql: impl Into<String>) -> Self {
        if cond {
            self.push(sql)
        } else {
            self
        }
    }

    /// Bind a parameter and append `prefix` followed by its `$n` placeholder
    pub fn bind(mut self, prefix: &str, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self.fragments
            .push(format!("{}${}", prefix, self.params.len()));
        self
    }

    /// Bind a parameter and return its placeholder, for fragments that use
    /// the same parameter more than once
    pub fn bind_placeholder(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("${}", self.params.len())
    }

    /// Append a fragment built with previously bound placeholders
    pub fn push_mut(&mut self, sql: impl Into<String>) {
        self.fragments.push(sql.into());
    }

    /// The query label
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Bound parameters in placeholder order
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Bound parameter at `index`, if any
    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    /// Render the final SQL text
    pub fn sql(&self) -> String {
        self.fragments.concat()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Quote an identifier the way `quote_ident` does
pub fn quote_ident(ident: &str) -> String {
    let plain = !ident.is_empty()
        && ident
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}
