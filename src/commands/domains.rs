//! `\dD` - list domains

use std::sync::Arc;

use super::{name_filter, scope, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\dD",
        "\\dD[+] [pattern]",
        "List domains.",
        Arc::new(PatternQuery::new(query)),
    ));
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let q = Query::new("list.domains")
        .push(
            "SELECT n.nspname::text AS schema, \
             t.typname::text AS name, \
             pg_catalog.format_type(t.typbasetype, t.typtypmod) AS type, \
             pg_catalog.ltrim((COALESCE((SELECT (' collate ' || c.collname) \
                 FROM pg_catalog.pg_collation AS c, pg_catalog.pg_type AS bt \
                 WHERE c.oid = t.typcollation AND bt.oid = t.typbasetype \
                 AND t.typcollation <> bt.typcollation), '') \
               || CASE WHEN t.typnotnull THEN ' not null' ELSE '' END) \
               || CASE WHEN t.typdefault IS NOT NULL THEN (' default ' || t.typdefault) \
                  ELSE '' END) AS modifier, \
             pg_catalog.array_to_string(ARRAY( \
               SELECT pg_catalog.pg_get_constraintdef(r.oid, TRUE) \
               FROM pg_catalog.pg_constraint AS r WHERE t.oid = r.contypid), ' ') AS check",
        )
        .push_if(
            verbose,
            ", pg_catalog.array_to_string(t.typacl, E'\\n') AS access_privileges, \
             d.description AS description",
        )
        .push(
            " FROM pg_catalog.pg_type AS t \
             LEFT JOIN pg_catalog.pg_namespace AS n ON n.oid = t.typnamespace",
        )
        .push_if(
            verbose,
            " LEFT JOIN pg_catalog.pg_description d ON d.classoid = t.tableoid \
             AND d.objoid = t.oid AND d.objsubid = 0",
        )
        .push(" WHERE t.typtype = 'd'");

    let q = scope(q, pattern, "n.nspname", "pg_catalog.pg_type_is_visible(t.oid)");
    name_filter(q, pattern, "t.typname").push(" ORDER BY 1, 2")
}
