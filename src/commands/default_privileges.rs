//! `\ddp` - default access privileges

use std::sync::Arc;

use super::PatternQuery;
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\ddp",
        "\\ddp [pattern]",
        "Lists default access privilege settings.",
        Arc::new(PatternQuery::new(query)),
    ));
}

/// The name part of the pattern is matched against either the schema or the
/// owning role
pub fn query(pattern: &NamePattern, _verbose: bool) -> Query {
    let mut q = Query::new("list.default_privileges").push(
        "SELECT pg_catalog.pg_get_userbyid(d.defaclrole)::text AS owner, \
         n.nspname::text AS schema, \
         CASE d.defaclobjtype WHEN 'r' THEN 'table' \
                              WHEN 'S' THEN 'sequence' \
                              WHEN 'f' THEN 'function' \
                              WHEN 'T' THEN 'type' \
                              WHEN 'n' THEN 'schema' END AS type, \
         pg_catalog.array_to_string(d.defaclacl, E'\\n') AS access_privileges \
         FROM pg_catalog.pg_default_acl d \
         LEFT JOIN pg_catalog.pg_namespace n ON n.oid = d.defaclnamespace",
    );

    if let Some(name) = pattern.name_filter() {
        let p = q.bind_placeholder(name);
        q.push_mut(format!(
            " WHERE (n.nspname OPERATOR(pg_catalog.~) {p} COLLATE pg_catalog.default \
             OR pg_catalog.pg_get_userbyid(d.defaclrole) OPERATOR(pg_catalog.~) {p} \
             COLLATE pg_catalog.default)"
        ));
    }

    q.push(" ORDER BY 1, 2, 3")
}
