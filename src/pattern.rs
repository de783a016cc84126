//! Identifier pattern compiler
//!
//! Turns the glob-like patterns accepted by meta-commands (`public.user*`,
//! `"MixedCase"`, `tbl_?`) into anchored regular expressions suitable for the
//! server's `~` operator. An empty filter means "unconstrained"; callers then
//! apply their own default-visibility predicate instead.

use regex::Regex;

use crate::error::{Error, Result};

/// Regex metacharacters escaped inside a quoted segment
const QUOTED_META: &str = "|*+?()[]{}.^\\";

/// A compiled `schema.name` pattern
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamePattern {
    /// Anchored schema regex, or empty when unconstrained
    pub schema: String,
    /// Anchored name regex, or empty when unconstrained
    pub name: String,
    unterminated_quote: bool,
}

impl NamePattern {
    /// Schema filter, if the pattern constrains it
    pub fn schema_filter(&self) -> Option<&str> {
        (!self.schema.is_empty()).then_some(self.schema.as_str())
    }

    /// Name filter, if the pattern constrains it
    pub fn name_filter(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }

    /// Neither schema nor name is constrained
    pub fn is_unfiltered(&self) -> bool {
        self.schema.is_empty() && self.name.is_empty()
    }

    /// The scanner reached the end of input inside a quoted segment
    pub fn has_unterminated_quote(&self) -> bool {
        self.unterminated_quote
    }

    /// Compile both filters for client-side matching.
    ///
    /// Mirrors the server's regex match so callers can filter names they
    /// already hold without a round trip. Unquoted regex syntax passes
    /// through the compiler, so this can fail.
    pub fn matcher(&self) -> Result<NameMatcher> {
        Ok(NameMatcher {
            schema: self.schema_filter().map(build_regex).transpose()?,
            name: self.name_filter().map(build_regex).transpose()?,
        })
    }
}

/// Compiled filters of a [`NamePattern`]
#[derive(Debug, Clone)]
pub struct NameMatcher {
    schema: Option<Regex>,
    name: Option<Regex>,
}

impl NameMatcher {
    /// Both filters accept the entry; an absent filter accepts anything
    pub fn is_match(&self, schema: &str, name: &str) -> bool {
        self.schema.as_ref().map_or(true, |re| re.is_match(schema))
            && self.name.as_ref().map_or(true, |re| re.is_match(name))
    }
}

fn build_regex(filter: &str) -> Result<Regex> {
    Regex::new(filter).map_err(|source| Error::InvalidPattern {
        pattern: filter.to_string(),
        source,
    })
}

/// Compile a pattern into `(schema, name)` filters.
///
/// Unquoted text folds to lower case, `*` becomes `.*`, `?` becomes `.`, and
/// the first unquoted `.` separates schema from name. Quoted text is taken
/// literally with regex metacharacters escaped; `""` inside quotes yields a
/// literal quote. `$` is escaped everywhere. An unterminated quote is accepted
/// and runs to the end of input; see [`compile_strict`] to reject it.
pub fn compile(pattern: &str) -> NamePattern {
    let mut in_quotes = false;
    let mut buf = String::with_capacity(pattern.len() + 8);
    let mut schema: Option<String> = None;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    buf.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            c if !in_quotes && c.is_ascii_uppercase() => buf.push(c.to_ascii_lowercase()),
            '*' if !in_quotes => buf.push_str(".*"),
            '?' if !in_quotes => buf.push('.'),
            '.' if !in_quotes => {
                if schema.is_none() {
                    schema = Some(std::mem::take(&mut buf));
                } else {
                    // Further separators belong to the name, matched literally
                    buf.push_str("\\.");
                }
            }
            c => {
                if c == '$' || (in_quotes && QUOTED_META.contains(c)) {
                    buf.push('\\');
                }
                buf.push(c);
            }
        }
    }

    NamePattern {
        schema: schema.map(anchor).unwrap_or_default(),
        name: anchor(buf),
        unterminated_quote: in_quotes,
    }
}

/// Like [`compile`], but rejects an unterminated quoted segment
pub fn compile_strict(pattern: &str) -> Result<NamePattern> {
    let compiled = compile(pattern);
    if compiled.has_unterminated_quote() {
        return Err(Error::PatternCompileAmbiguity(pattern.to_string()));
    }
    Ok(compiled)
}

fn anchor(buf: String) -> String {
    if buf.is_empty() {
        buf
    } else {
        format!("^({})$", buf)
    }
}
