//! Object resolver
//!
//! Enumerates the relations a compiled pattern matches. Without an explicit
//! schema the search is restricted to relations visible on the active search
//! path; a fully empty pattern additionally skips the system schemas.

use super::types::{CatalogObjectRef, RelKind};
use crate::error::{Error, Result};
use crate::pattern::NamePattern;
use crate::query::{ExecContext, Query, Queryer};

/// Predicate applied when the pattern names no schema
pub const VISIBLE: &str = " AND pg_catalog.pg_table_is_visible(c.oid)";

/// Predicate hiding system schemas when nothing at all is filtered
pub const USER_SCHEMAS: &str = " AND n.nspname <> 'pg_catalog'\
 AND n.nspname <> 'information_schema'\
 AND n.nspname !~ '^pg_toast'";

/// Build the resolver query for `pattern` restricted to `kinds`
/// (all kinds when empty)
pub fn resolve_query(pattern: &NamePattern, kinds: &[RelKind]) -> Query {
    let mut q = Query::new("resolve.relations").push(
        "SELECT c.oid, n.nspname, c.relname, c.relkind::text \
         FROM pg_catalog.pg_class c \
         LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE true",
    );

    if !kinds.is_empty() {
        let codes = kinds.iter().map(|k| k.code().to_string()).collect::<Vec<_>>();
        q = q.bind(" AND c.relkind::text = ANY(", codes).push(")");
    }

    q = match pattern.schema_filter() {
        Some(schema) => q.bind(" AND n.nspname OPERATOR(pg_catalog.~) ", schema),
        None => q.push(VISIBLE),
    };

    if pattern.is_unfiltered() {
        q = q.push(USER_SCHEMAS);
    }

    if let Some(name) = pattern.name_filter() {
        q = q.bind(" AND c.relname OPERATOR(pg_catalog.~) ", name);
    }

    q.push(" ORDER BY 2, 3")
}

/// Enumerate matching relations, ordered by schema then name
pub async fn resolve(
    ctx: &ExecContext,
    db: &dyn Queryer,
    pattern: &NamePattern,
    kinds: &[RelKind],
) -> Result<Vec<CatalogObjectRef>> {
    let query = resolve_query(pattern, kinds);
    let label = query.label();
    let result = ctx.run(db, &query).await?;

    result
        .rows
        .iter()
        .map(|row| {
            Ok(CatalogObjectRef {
                oid: row.oid(label, 0)?,
                schema: row.opt_text(label, 1)?.unwrap_or_default(),
                name: row.text(label, 2)?,
                kind: RelKind::from_code_str(&row.text(label, 3)?),
            })
        })
        .collect()
}

/// Like [`resolve`], but a pattern matching nothing is an error
pub async fn resolve_required(
    ctx: &ExecContext,
    db: &dyn Queryer,
    raw_pattern: &str,
    pattern: &NamePattern,
    kinds: &[RelKind],
) -> Result<Vec<CatalogObjectRef>> {
    let objects = resolve(ctx, db, pattern, kinds).await?;
    if objects.is_empty() {
        return Err(Error::ObjectNotFound(raw_pattern.to_string()));
    }
    Ok(objects)
}
