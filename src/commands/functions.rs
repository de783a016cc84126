//! `\df` - list functions

use std::sync::Arc;

use super::{name_filter, scope, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\df",
        "\\df[+] [pattern]",
        "List functions.",
        Arc::new(PatternQuery::new(query)),
    ));
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let q = Query::new("list.functions")
        .push(
            "SELECT n.nspname::text AS schema, \
             p.proname::text AS name, \
             pg_catalog.pg_get_function_result(p.oid) AS \"Result data type\", \
             pg_catalog.pg_get_function_arguments(p.oid) AS \"Argument data types\", \
             CASE WHEN p.prokind = 'a' THEN 'agg' \
                  WHEN p.prokind = 'w' THEN 'window' \
                  WHEN p.prorettype = 'pg_catalog.trigger'::pg_catalog.regtype THEN 'trigger' \
                  ELSE 'normal' END AS type",
        )
        .push_if(
            verbose,
            ", CASE WHEN p.provolatile = 'i' THEN 'immutable' \
                    WHEN p.provolatile = 's' THEN 'stable' \
                    WHEN p.provolatile = 'v' THEN 'volatile' END AS \"Volatility\", \
             pg_catalog.pg_get_userbyid(p.proowner)::text AS owner, \
             l.lanname::text AS \"Language\", \
             p.prosrc AS \"Source code\", \
             pg_catalog.obj_description(p.oid, 'pg_proc') AS description",
        )
        .push(
            " FROM pg_catalog.pg_proc p \
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace",
        )
        .push_if(verbose, " LEFT JOIN pg_catalog.pg_language l ON l.oid = p.prolang")
        .push(" WHERE true");

    let q = scope(q, pattern, "n.nspname", "pg_catalog.pg_function_is_visible(p.oid)");
    name_filter(q, pattern, "p.proname").push(" ORDER BY 1, 2, 4")
}
