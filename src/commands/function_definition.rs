//! `\sf` - show a function's definition

use std::sync::Arc;

use async_trait::async_trait;

use crate::command::{CommandDescriptor, Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::query::{ExecContext, Query, QueryResult, Queryer, Row, Value};

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\sf",
        "\\sf[+] FUNCNAME",
        "Show a function's definition.",
        Arc::new(ShowFunctionDefinition),
    ));
}

pub struct ShowFunctionDefinition;

/// Resolve a function name (or signature, when it has parentheses) to an oid
pub fn lookup_query(name: &str) -> Query {
    let cast = if name.contains('(') {
        "::pg_catalog.regprocedure"
    } else {
        "::pg_catalog.regproc"
    };
    Query::new("show.function.lookup")
        .bind("SELECT ", name)
        .push(format!("::text{}::pg_catalog.oid", cast))
}

pub fn definition_query(oid: u32) -> Query {
    Query::new("show.function.definition")
        .bind("SELECT pg_catalog.pg_get_functiondef(", oid)
        .push(") AS source")
}

/// Prefix every line with a 7-wide gutter; numbering starts at the line
/// beginning with `AS `
pub fn number_lines(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    let mut line_no: Option<usize> = None;

    for line in source.split('\n') {
        line_no = match line_no {
            Some(n) => Some(n + 1),
            None if line.starts_with("AS ") => Some(1),
            None => None,
        };
        let gutter = line_no.map(|n| n.to_string()).unwrap_or_default();
        out.push_str(&format!("{:<7} {}\n", gutter, line));
    }
    out
}

#[async_trait]
impl Handler for ShowFunctionDefinition {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult> {
        let lookup = lookup_query(args);
        let oid = ctx.run_one(db, &lookup).await?.oid(lookup.label(), 0)?;

        let definition = definition_query(oid);
        let result = ctx.run(db, &definition).await?;
        if !verbose {
            return Ok(SpecialResult::Rows(result));
        }

        let source = match result.first() {
            Some(row) => row.opt_text(definition.label(), 0)?.unwrap_or_default(),
            None => String::new(),
        };
        Ok(SpecialResult::Rows(QueryResult::new(
            vec!["source".to_string()],
            vec![Row::new(vec![Value::String(number_lines(&source))])],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_cast_depends_on_signature() {
        assert!(lookup_query("add").sql().ends_with("$1::text::pg_catalog.regproc::pg_catalog.oid"));
        assert!(lookup_query("add(int, int)")
            .sql()
            .contains("::pg_catalog.regprocedure"));
    }

    #[test]
    fn test_number_lines_starts_at_as() {
        let source = "CREATE FUNCTION f()\n RETURNS int\nAS $$\nSELECT 1\n$$";
        let numbered = number_lines(source);
        let lines: Vec<&str> = numbered.lines().collect();
        assert_eq!(lines[0], "        CREATE FUNCTION f()");
        assert_eq!(lines[2], "1       AS $$");
        assert_eq!(lines[3], "2       SELECT 1");
        assert_eq!(lines[4], "3       $$");
    }
}
