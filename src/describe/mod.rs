//! Describe engine
//!
//! Builds one [`DescribeReport`] per resolved relation: a table-info lookup,
//! the column grid, then the footer sections that apply to the relation kind.
//! Every query threads the caller's [`ExecContext`].

pub mod columns;
pub mod footer;
pub mod report;

use crate::catalog::{CatalogObjectRef, RelKind};
use crate::error::Result;
use crate::query::{ExecContext, Query, Queryer};

pub use report::{DescribeReport, FiringGroups, FiringMode, FooterSections};

const TABLE_INFO: &str = "describe.table_info";

/// Flags from `pg_class` that decide which sections apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub oid: u32,
    pub check_count: i64,
    pub kind: RelKind,
    pub has_index: bool,
    pub has_rules: bool,
    pub has_triggers: bool,
    /// Storage options, including `toast.` ones
    pub options: Option<String>,
    pub tablespace: Option<String>,
    /// Type a typed table was created from
    pub of_type: Option<String>,
    pub persistence: String,
    pub is_partition: bool,
}

pub fn table_info_query(oid: u32) -> Query {
    Query::new(TABLE_INFO)
        .push(
            "SELECT c.relchecks::int4, c.relkind::text, c.relhasindex, \
             c.relhasrules, c.relhastriggers, \
             pg_catalog.array_to_string(c.reloptions || array(SELECT 'toast.' || x \
             FROM pg_catalog.unnest(tc.reloptions) x), ', '), \
             c.reltablespace::text, \
             CASE WHEN c.reloftype = 0 THEN '' \
             ELSE c.reloftype::pg_catalog.regtype::pg_catalog.text END, \
             c.relpersistence::text, \
             c.relispartition \
             FROM pg_catalog.pg_class c \
             LEFT JOIN pg_catalog.pg_class tc ON (c.reltoastrelid = tc.oid) \
             WHERE c.oid = ",
        )
        .bind("", oid)
}

/// Fetch the table info row for `oid`
pub async fn table_info(ctx: &ExecContext, db: &dyn Queryer, oid: u32) -> Result<TableInfo> {
    let row = ctx.run_one(db, &table_info_query(oid)).await?;
    Ok(TableInfo {
        oid,
        check_count: row.int(TABLE_INFO, 0)?,
        kind: RelKind::from_code_str(&row.text(TABLE_INFO, 1)?),
        has_index: row.boolean(TABLE_INFO, 2)?,
        has_rules: row.boolean(TABLE_INFO, 3)?,
        has_triggers: row.boolean(TABLE_INFO, 4)?,
        options: row.opt_text(TABLE_INFO, 5)?,
        tablespace: row.opt_text(TABLE_INFO, 6)?,
        of_type: row.opt_text(TABLE_INFO, 7)?.filter(|t| !t.is_empty()),
        persistence: row.opt_text(TABLE_INFO, 8)?.unwrap_or_default(),
        is_partition: row.boolean(TABLE_INFO, 9)?,
    })
}

/// Describe one relation
pub async fn describe(
    ctx: &ExecContext,
    db: &dyn Queryer,
    object: &CatalogObjectRef,
    verbose: bool,
) -> Result<DescribeReport> {
    let info = table_info(ctx, db, object.oid).await?;

    let mut report = DescribeReport::new(
        object.schema.as_str(),
        object.name.as_str(),
        info.kind,
        columns::headers(info.kind, verbose),
    );

    for row in columns::collect(ctx, db, &info, &object.schema, &object.name, verbose).await? {
        report.push_row(row)?;
    }

    report.footer = footer::collect(ctx, db, &info, &object.schema, verbose).await?;
    Ok(report)
}

/// Describe every object in order; the first failure aborts the batch
pub async fn describe_all(
    ctx: &ExecContext,
    db: &dyn Queryer,
    objects: &[CatalogObjectRef],
    verbose: bool,
) -> Result<Vec<DescribeReport>> {
    let mut reports = Vec::with_capacity(objects.len());
    for object in objects {
        reports.push(describe(ctx, db, object, verbose).await?);
    }
    Ok(reports)
}
