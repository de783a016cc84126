//! `\dT` - list data types

use std::sync::Arc;

use super::{scope, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\dT",
        "\\dT[+] [pattern]",
        "List data types.",
        Arc::new(PatternQuery::new(query)),
    ));
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let columns = if verbose {
        ", t.typname::text AS internal_name, \
         CASE WHEN t.typrelid != 0 THEN 'tuple' \
              WHEN t.typlen < 0 THEN 'var' \
              ELSE t.typlen::text END AS size, \
         pg_catalog.array_to_string(ARRAY( \
           SELECT e.enumlabel::text FROM pg_catalog.pg_enum e \
           WHERE e.enumtypid = t.oid ORDER BY e.enumsortorder), E'\\n') AS elements, \
         pg_catalog.array_to_string(t.typacl, E'\\n') AS access_privileges, \
         pg_catalog.obj_description(t.oid, 'pg_type') AS description"
    } else {
        ", pg_catalog.obj_description(t.oid, 'pg_type') AS description"
    };

    let mut q = Query::new("list.datatypes")
        .push(
            "SELECT n.nspname::text AS schema, \
             pg_catalog.format_type(t.oid, NULL) AS name",
        )
        .push(columns)
        .push(
            " FROM pg_catalog.pg_type t \
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace \
             WHERE (t.typrelid = 0 OR \
               (SELECT c.relkind = 'c' FROM pg_catalog.pg_class c WHERE c.oid = t.typrelid)) \
             AND NOT EXISTS (SELECT 1 FROM pg_catalog.pg_type el \
               WHERE el.oid = t.typelem AND el.typarray = t.oid)",
        );

    q = scope(q, pattern, "n.nspname", "pg_catalog.pg_type_is_visible(t.oid)");

    // The name pattern may match either the internal or the formatted name.
    if let Some(name) = pattern.name_filter() {
        let p = q.bind_placeholder(name);
        q.push_mut(format!(
            " AND (t.typname OPERATOR(pg_catalog.~) {p} \
             OR pg_catalog.format_type(t.oid, NULL) OPERATOR(pg_catalog.~) {p})"
        ));
    }

    q.push(" ORDER BY 1, 2")
}
