//! `\l` - list databases

use std::sync::Arc;

use super::{name_filter, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(
        CommandDescriptor::new(
            "\\l",
            "\\l[+] [pattern]",
            "List databases.",
            Arc::new(PatternQuery::new(query)),
        )
        .alias("\\list"),
    );
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let q = Query::new("list.databases")
        .push(
            "SELECT d.datname::text AS name, \
             pg_catalog.pg_get_userbyid(d.datdba)::text AS owner, \
             pg_catalog.pg_encoding_to_char(d.encoding)::text AS encoding, \
             d.datcollate::text AS collate, \
             d.datctype::text AS ctype, \
             pg_catalog.array_to_string(d.datacl, E'\\n') AS access_privileges",
        )
        .push_if(
            verbose,
            ", CASE WHEN pg_catalog.has_database_privilege(d.datname, 'CONNECT') \
             THEN pg_catalog.pg_size_pretty(pg_catalog.pg_database_size(d.datname)) \
             ELSE 'No Access' END AS size, \
             t.spcname::text AS \"Tablespace\", \
             pg_catalog.shobj_description(d.oid, 'pg_database') AS description",
        )
        .push(" FROM pg_catalog.pg_database d")
        .push_if(verbose, " JOIN pg_catalog.pg_tablespace t ON d.dattablespace = t.oid")
        .push(" WHERE true");

    name_filter(q, pattern, "d.datname").push(" ORDER BY 1")
}
