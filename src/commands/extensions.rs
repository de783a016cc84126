//! `\dx` - list extensions
//!
//! The verbose form lists the member objects of every matching extension.

use std::sync::Arc;

use async_trait::async_trait;

use super::name_filter;
use crate::command::{CommandDescriptor, ExtensionDescription, Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::pattern::NamePattern;
use crate::query::{ExecContext, Query, Queryer};

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\dx",
        "\\dx[+] [pattern]",
        "List extensions.",
        Arc::new(ListExtensions),
    ));
}

pub struct ListExtensions;

pub fn query(pattern: &NamePattern) -> Query {
    let q = Query::new("list.extensions").push(
        "SELECT e.extname::text AS name, \
         e.extversion AS version, \
         n.nspname::text AS schema, \
         c.description AS description \
         FROM pg_catalog.pg_extension e \
         LEFT JOIN pg_catalog.pg_namespace n ON n.oid = e.extnamespace \
         LEFT JOIN pg_catalog.pg_description c ON c.objoid = e.oid \
           AND c.classoid = 'pg_catalog.pg_extension'::pg_catalog.regclass \
         WHERE true",
    );
    name_filter(q, pattern, "e.extname").push(" ORDER BY 1, 2")
}

/// Extensions to describe; a non-empty `name` is matched exactly
pub fn find_query(name: &str) -> Query {
    let q = Query::new("list.extensions.find")
        .push("SELECT e.extname::text, e.oid FROM pg_catalog.pg_extension e");
    let q = if name.is_empty() {
        q
    } else {
        q.bind(" WHERE e.extname = ", name)
    };
    q.push(" ORDER BY 1, 2")
}

pub fn members_query(oid: u32) -> Query {
    Query::new("list.extensions.members")
        .push(
            "SELECT pg_catalog.pg_describe_object(classid, objid, 0) AS object_description \
             FROM pg_catalog.pg_depend \
             WHERE refclassid = 'pg_catalog.pg_extension'::pg_catalog.regclass \
             AND deptype = 'e' AND refobjid = ",
        )
        .bind("", oid)
        .push(" ORDER BY 1")
}

#[async_trait]
impl Handler for ListExtensions {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult> {
        if !verbose {
            let pattern = ctx.compile_pattern(args)?;
            return Ok(SpecialResult::Rows(ctx.run(db, &query(&pattern)).await?));
        }

        let find = find_query(args);
        let found = ctx.run(db, &find).await?;

        let mut descriptions = Vec::with_capacity(found.len());
        for row in &found.rows {
            let name = row.text(find.label(), 0)?;
            let oid = row.oid(find.label(), 1)?;

            let members = members_query(oid);
            let objects = ctx
                .run(db, &members)
                .await?
                .rows
                .iter()
                .map(|r| r.opt_text(members.label(), 0).map(Option::unwrap_or_default))
                .collect::<Result<Vec<_>>>()?;

            descriptions.push(ExtensionDescription { name, objects });
        }

        Ok(SpecialResult::ExtensionVerbose(descriptions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use crate::query::Value;

    #[test]
    fn test_find_query() {
        assert!(find_query("").params().is_empty());
        let q = find_query("hstore");
        assert!(q.sql().contains("e.extname = $1"));
        assert_eq!(q.param(0), Some(&Value::from("hstore")));
    }

    #[test]
    fn test_plain_listing_uses_pattern() {
        let q = query(&compile("pg_*"));
        assert!(q.sql().contains("e.extname OPERATOR(pg_catalog.~) $1"));
    }

    #[test]
    fn test_members_query_binds_oid() {
        assert_eq!(members_query(16400).params(), &[Value::Oid(16400)]);
    }
}
