//! `\dn` - list schemas

use std::sync::Arc;

use super::{name_filter, PatternQuery};
use crate::command::{CommandDescriptor, Registry};
use crate::pattern::NamePattern;
use crate::query::Query;

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\dn",
        "\\dn[+] [pattern]",
        "List schemas.",
        Arc::new(PatternQuery::new(query)),
    ));
}

pub fn query(pattern: &NamePattern, verbose: bool) -> Query {
    let q = Query::new("list.schemas")
        .push(
            "SELECT n.nspname::text AS name, \
             pg_catalog.pg_get_userbyid(n.nspowner)::text AS owner",
        )
        .push_if(
            verbose,
            ", pg_catalog.array_to_string(n.nspacl, E'\\n') AS access_privileges, \
             pg_catalog.obj_description(n.oid, 'pg_namespace') AS description",
        )
        .push(" FROM pg_catalog.pg_namespace n WHERE true")
        .push_if(
            pattern.is_unfiltered(),
            " AND n.nspname !~ '^pg_' AND n.nspname <> 'information_schema'",
        );

    name_filter(q, pattern, "n.nspname").push(" ORDER BY 1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    #[test]
    fn test_default_hides_system_schemas() {
        assert!(query(&compile(""), false).sql().contains("!~ '^pg_'"));
        let q = query(&compile("pg_*"), false);
        assert!(!q.sql().contains("!~ '^pg_'"));
        assert_eq!(q.params().len(), 1);
    }
}
