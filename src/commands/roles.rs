//! `\du` / `\dg` - list roles

use std::sync::Arc;

use super::{name_filter, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(
        CommandDescriptor::new(
            "\\du",
            "\\du[+] [pattern]",
            "List roles.",
            Arc::new(PatternQuery::new(query)),
        )
        .alias("\\dg"),
    );
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let q = Query::new("list.roles")
        .push(
            "SELECT r.rolname::text, r.rolsuper, r.rolinherit, r.rolcreaterole, \
             r.rolcreatedb, r.rolcanlogin, r.rolconnlimit, r.rolvaliduntil::text, \
             ARRAY(SELECT b.rolname::text FROM pg_catalog.pg_auth_members m \
             JOIN pg_catalog.pg_roles b ON (m.roleid = b.oid) \
             WHERE m.member = r.oid) AS memberof",
        )
        .push_if(
            verbose,
            ", pg_catalog.shobj_description(r.oid, 'pg_authid') AS description",
        )
        .push(", r.rolreplication FROM pg_catalog.pg_roles r WHERE true");

    name_filter(q, pattern, "r.rolname").push(" ORDER BY 1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    #[test]
    fn test_verbose_adds_description() {
        assert!(query(&compile(""), true).sql().contains("shobj_description"));
        assert!(!query(&compile(""), false).sql().contains("shobj_description"));
    }
}
