//! `\d` / `\describe` - describe relations

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{resolve_required, RelKind};
use crate::command::{CommandDescriptor, Handler, Registry, SpecialResult};
use crate::describe::describe_all;
use crate::error::Result;
use crate::query::{ExecContext, Queryer};

/// Kinds listed by `\d` without a pattern
pub const LISTED_KINDS: [RelKind; 6] = [
    RelKind::Table,
    RelKind::PartitionedTable,
    RelKind::View,
    RelKind::MaterializedView,
    RelKind::Sequence,
    RelKind::ForeignTable,
];

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\d",
        "\\d[+] [pattern]",
        "List or describe tables, views and sequences.",
        Arc::new(DescribeTables),
    ));
    registry.register(
        CommandDescriptor::new(
            "\\describe",
            "\\describe[+] [pattern]",
            "Describe tables, views and sequences.",
            Arc::new(DescribeTables),
        )
        .case_insensitive(),
    );
}

/// Lists relations for an empty pattern, otherwise describes every match
pub struct DescribeTables;

#[async_trait]
impl Handler for DescribeTables {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult> {
        let pattern = ctx.compile_pattern(args)?;

        if args.is_empty() {
            let query = super::list_objects::query(&pattern, verbose, &LISTED_KINDS);
            return Ok(SpecialResult::Rows(ctx.run(db, &query).await?));
        }

        let objects = resolve_required(ctx, db, args, &pattern, &[]).await?;
        let reports = describe_all(ctx, db, &objects, verbose).await?;
        Ok(SpecialResult::DescribeTable(reports))
    }
}
