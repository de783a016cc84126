//! `\dt`, `\dv`, `\dm`, `\ds`, `\di` - list relations by kind

use std::sync::Arc;

use async_trait::async_trait;

use super::name_filter;
use crate::catalog::RelKind;
use crate::command::{CommandDescriptor, Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::pattern::NamePattern;
use crate::query::{ExecContext, Query, Queryer};

pub fn register(registry: &mut Registry) {
    let commands: [(&str, &str, &'static [RelKind]); 5] = [
        ("\\dt", "List tables.", &[RelKind::Table, RelKind::PartitionedTable]),
        ("\\dv", "List views.", &[RelKind::View]),
        ("\\dm", "List materialized views.", &[RelKind::MaterializedView]),
        ("\\ds", "List sequences.", &[RelKind::Sequence]),
        ("\\di", "List indexes.", &[RelKind::Index, RelKind::PartitionedIndex]),
    ];

    for (verb, description, kinds) in commands {
        registry.register(CommandDescriptor::new(
            verb,
            &format!("{}[+] [pattern]", verb),
            description,
            Arc::new(ListObjects::new(kinds)),
        ));
    }
}

/// Lists relations whose kind is one of `kinds`
pub struct ListObjects {
    kinds: &'static [RelKind],
}

impl ListObjects {
    pub fn new(kinds: &'static [RelKind]) -> Self {
        Self { kinds }
    }
}

#[async_trait]
impl Handler for ListObjects {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult> {
        let pattern = ctx.compile_pattern(args)?;
        let result = ctx.run(db, &query(&pattern, verbose, self.kinds)).await?;
        Ok(SpecialResult::Rows(result))
    }
}

pub fn query(pattern: &NamePattern, verbose: bool, kinds: &[RelKind]) -> Query {
    let codes = kinds
        .iter()
        .map(|k| k.code().to_string())
        .collect::<Vec<_>>();

    let q = Query::new("list.objects")
        .push(
            "SELECT n.nspname::text AS schema, \
             c.relname::text AS name, \
             CASE c.relkind \
               WHEN 'r' THEN 'table' WHEN 'v' THEN 'view' \
               WHEN 'p' THEN 'partitioned table' \
               WHEN 'm' THEN 'materialized view' WHEN 'i' THEN 'index' \
               WHEN 'I' THEN 'partitioned index' \
               WHEN 'S' THEN 'sequence' WHEN 's' THEN 'special' \
               WHEN 'f' THEN 'foreign table' END AS type, \
             pg_catalog.pg_get_userbyid(c.relowner)::text AS owner",
        )
        .push_if(
            verbose,
            ", pg_catalog.pg_size_pretty(pg_catalog.pg_table_size(c.oid)) AS size, \
             pg_catalog.obj_description(c.oid, 'pg_class') AS description",
        )
        .push(
            " FROM pg_catalog.pg_class c \
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace",
        )
        .bind(" WHERE c.relkind::text = ANY(", codes)
        .push(")");

    let q = match pattern.schema_filter() {
        Some(schema) => q.bind(" AND n.nspname OPERATOR(pg_catalog.~) ", schema),
        None => q.push(
            " AND n.nspname <> 'pg_catalog' \
             AND n.nspname <> 'information_schema' \
             AND n.nspname !~ '^pg_toast' \
             AND pg_catalog.pg_table_is_visible(c.oid)",
        ),
    };

    name_filter(q, pattern, "c.relname").push(" ORDER BY 1, 2")
}
