//! `\dp` / `\z` - table, column and policy privileges

use std::sync::Arc;

use super::{name_filter, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(
        CommandDescriptor::new(
            "\\dp",
            "\\dp [pattern]",
            "List privileges.",
            Arc::new(PatternQuery::new(query)),
        )
        .alias("\\z"),
    );
}

const SELECT: &str = "SELECT n.nspname::text AS schema, \
    c.relname::text AS name, \
    CASE c.relkind WHEN 'r' THEN 'table' \
                   WHEN 'v' THEN 'view' \
                   WHEN 'm' THEN 'materialized view' \
                   WHEN 'S' THEN 'sequence' \
                   WHEN 'f' THEN 'foreign table' \
                   WHEN 'p' THEN 'partitioned table' END AS type, \
    pg_catalog.array_to_string(c.relacl, E'\\n') AS access_privileges, \
    pg_catalog.array_to_string(ARRAY( \
      SELECT attname || E':\\n  ' || pg_catalog.array_to_string(attacl, E'\\n  ') \
      FROM pg_catalog.pg_attribute a \
      WHERE attrelid = c.oid AND NOT attisdropped AND attacl IS NOT NULL \
    ), E'\\n') AS column_privileges, \
    pg_catalog.array_to_string(ARRAY( \
      SELECT polname \
      || CASE WHEN NOT polpermissive THEN E' (RESTRICTIVE)' ELSE '' END \
      || CASE WHEN polcmd != '*' THEN E' (' || polcmd::pg_catalog.text || E'):' ELSE E':' END \
      || CASE WHEN polqual IS NOT NULL \
         THEN E'\\n  (u): ' || pg_catalog.pg_get_expr(polqual, polrelid) ELSE E'' END \
      || CASE WHEN polwithcheck IS NOT NULL \
         THEN E'\\n  (c): ' || pg_catalog.pg_get_expr(polwithcheck, polrelid) ELSE E'' END \
      || CASE WHEN polroles <> '{0}' \
         THEN E'\\n  to: ' || pg_catalog.array_to_string(ARRAY( \
           SELECT rolname FROM pg_catalog.pg_roles WHERE oid = ANY (polroles) ORDER BY 1 \
         ), E', ') ELSE E'' END \
      FROM pg_catalog.pg_policy pol \
      WHERE polrelid = c.oid), E'\\n') AS policies \
    FROM pg_catalog.pg_class c \
    LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
    WHERE c.relkind IN ('r','v','m','S','f','p')";

pub fn query(pattern: &NamePattern, _verbose: bool) -> Query {
    let mut q = Query::new("list.privileges").push(SELECT);
    q = match pattern.schema_filter() {
        Some(schema) => q.bind(" AND n.nspname OPERATOR(pg_catalog.~) ", schema),
        None => q.push(" AND pg_catalog.pg_table_is_visible(c.oid)"),
    };
    name_filter(q, pattern, "c.relname")
        .push(" AND n.nspname !~ '^pg_' ORDER BY 1, 2")
}
