//! `\db` - list tablespaces

use std::sync::Arc;

use async_trait::async_trait;

use super::name_filter;
use crate::command::{CommandDescriptor, Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::pattern::NamePattern;
use crate::query::{ExecContext, Query, Queryer};

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\db",
        "\\db[+] [pattern]",
        "List tablespaces.",
        Arc::new(ListTablespaces),
    ));
}

/// Probes for `pg_tablespace_location` before listing
pub struct ListTablespaces;

pub fn location_probe() -> Query {
    Query::text(
        "list.tablespaces.probe",
        "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_proc WHERE proname = 'pg_tablespace_location')",
    )
}

pub fn query(pattern: &NamePattern, location_supported: bool) -> Query {
    let q = Query::new("list.tablespaces")
        .push(
            "SELECT n.spcname::text AS name, \
             pg_catalog.pg_get_userbyid(n.spcowner)::text AS owner, ",
        )
        .push(if location_supported {
            "pg_catalog.pg_tablespace_location(n.oid) AS location"
        } else {
            "'Not supported' AS location"
        })
        .push(" FROM pg_catalog.pg_tablespace n WHERE true");

    name_filter(q, pattern, "n.spcname").push(" ORDER BY 1")
}

#[async_trait]
impl Handler for ListTablespaces {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        _verbose: bool,
    ) -> Result<SpecialResult> {
        let pattern = ctx.compile_pattern(args)?;
        let probe = location_probe();
        let supported = ctx.run_one(db, &probe).await?.boolean(probe.label(), 0)?;
        let result = ctx.run(db, &query(&pattern, supported)).await?;
        Ok(SpecialResult::Rows(result))
    }
}
