//! Footer sections of a describe report
//!
//! Each section is one catalog query keyed by the relation oid. Which
//! sections run depends on the relation kind and the table info flags.

use tracing::warn;

use super::report::{FiringGroups, FiringMode, FooterSections};
use super::TableInfo;
use crate::catalog::RelKind;
use crate::error::{Error, Result};
use crate::query::{ExecContext, Query, Queryer};

fn by_oid(label: &'static str, sql: &str, oid: u32) -> Query {
    let mut q = Query::new(label);
    let rel = q.bind_placeholder(oid);
    q.push_mut(sql.replace("{rel}", &rel));
    q
}

pub fn view_definition_query(oid: u32) -> Query {
    by_oid(
        "describe.view_definition",
        "SELECT pg_catalog.pg_get_viewdef({rel}::pg_catalog.oid, true)",
        oid,
    )
}

pub fn index_footer_query(oid: u32) -> Query {
    by_oid(
        "describe.index_footer",
        "SELECT i.indisunique, i.indisprimary, i.indisclustered, i.indisvalid, \
         (NOT i.indimmediate) AND EXISTS (SELECT 1 FROM pg_catalog.pg_constraint \
          WHERE conrelid = i.indrelid AND conindid = i.indexrelid \
          AND contype IN ('p','u','x') AND condeferrable) AS condeferrable, \
         (NOT i.indimmediate) AND EXISTS (SELECT 1 FROM pg_catalog.pg_constraint \
          WHERE conrelid = i.indrelid AND conindid = i.indexrelid \
          AND contype IN ('p','u','x') AND condeferred) AS condeferred, \
         a.amname::text, c2.relname::text, pg_catalog.pg_get_expr(i.indpred, i.indrelid, true) \
         FROM pg_catalog.pg_index i, pg_catalog.pg_class c, pg_catalog.pg_class c2, pg_catalog.pg_am a \
         WHERE i.indexrelid = c.oid AND c.oid = {rel} AND c.relam = a.oid AND i.indrelid = c2.oid",
        oid,
    )
}

pub fn sequence_owner_query(oid: u32) -> Query {
    by_oid(
        "describe.sequence_owner",
        "SELECT pg_catalog.quote_ident(nspname) || '.' || pg_catalog.quote_ident(relname) \
         || '.' || pg_catalog.quote_ident(attname) \
         FROM pg_catalog.pg_class c \
         INNER JOIN pg_catalog.pg_depend d ON c.oid = d.refobjid \
         INNER JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         INNER JOIN pg_catalog.pg_attribute a ON (a.attrelid = c.oid AND a.attnum = d.refobjsubid) \
         WHERE d.classid = 'pg_catalog.pg_class'::pg_catalog.regclass \
         AND d.refclassid = 'pg_catalog.pg_class'::pg_catalog.regclass \
         AND d.objid = {rel} AND d.deptype = 'a'",
        oid,
    )
}

pub fn indexes_query(oid: u32) -> Query {
    by_oid(
        "describe.indexes",
        "SELECT c2.relname::text, i.indisprimary, i.indisunique, i.indisclustered, i.indisvalid, \
         pg_catalog.pg_get_indexdef(i.indexrelid, 0, true), \
         pg_catalog.pg_get_constraintdef(con.oid, true), \
         con.contype::text, con.condeferrable, con.condeferred \
         FROM pg_catalog.pg_class c, pg_catalog.pg_class c2, pg_catalog.pg_index i \
         LEFT JOIN pg_catalog.pg_constraint con ON con.conrelid = i.indrelid \
         AND con.conindid = i.indexrelid AND con.contype IN ('p','u','x') \
         WHERE c.oid = {rel} AND c.oid = i.indrelid AND i.indexrelid = c2.oid \
         ORDER BY i.indisprimary DESC, i.indisunique DESC, c2.relname",
        oid,
    )
}

pub fn check_constraints_query(oid: u32) -> Query {
    by_oid(
        "describe.check_constraints",
        "SELECT r.conname::text, pg_catalog.pg_get_constraintdef(r.oid, true) \
         FROM pg_catalog.pg_constraint r \
         WHERE r.conrelid = {rel} AND r.contype = 'c' ORDER BY 1",
        oid,
    )
}

pub fn foreign_keys_query(oid: u32) -> Query {
    by_oid(
        "describe.foreign_keys",
        "SELECT r.conname::text, pg_catalog.pg_get_constraintdef(r.oid, true) \
         FROM pg_catalog.pg_constraint r \
         WHERE r.conrelid = {rel} AND r.contype = 'f' ORDER BY 1",
        oid,
    )
}

pub fn referenced_by_query(oid: u32) -> Query {
    by_oid(
        "describe.referenced_by",
        "SELECT c.conrelid::pg_catalog.regclass::text, c.conname::text, \
         pg_catalog.pg_get_constraintdef(c.oid, true) \
         FROM pg_catalog.pg_constraint c \
         WHERE c.confrelid = {rel} AND c.contype = 'f' ORDER BY 1",
        oid,
    )
}

pub fn rules_query(oid: u32) -> Query {
    by_oid(
        "describe.rules",
        "SELECT r.rulename::text, trim(trailing ';' from pg_catalog.pg_get_ruledef(r.oid, true)), \
         r.ev_enabled::text \
         FROM pg_catalog.pg_rewrite r WHERE r.ev_class = {rel} ORDER BY 1",
        oid,
    )
}

pub fn triggers_query(oid: u32) -> Query {
    by_oid(
        "describe.triggers",
        "SELECT t.tgname::text, pg_catalog.pg_get_triggerdef(t.oid, true), t.tgenabled::text \
         FROM pg_catalog.pg_trigger t \
         WHERE t.tgrelid = {rel} AND NOT t.tgisinternal ORDER BY 1",
        oid,
    )
}

pub fn partition_of_query(oid: u32) -> Query {
    by_oid(
        "describe.partition_of",
        "SELECT quote_ident(np.nspname) || '.' || quote_ident(cp.relname) || ' ' \
         || pg_get_expr(cc.relpartbound, cc.oid, true), \
         pg_get_partition_constraintdef(cc.oid) \
         FROM pg_catalog.pg_inherits i \
         INNER JOIN pg_catalog.pg_class cp ON cp.oid = i.inhparent \
         INNER JOIN pg_catalog.pg_namespace np ON np.oid = cp.relnamespace \
         INNER JOIN pg_catalog.pg_class cc ON cc.oid = i.inhrelid \
         WHERE cc.oid = {rel}",
        oid,
    )
}

pub fn partition_key_query(oid: u32) -> Query {
    by_oid(
        "describe.partition_key",
        "SELECT pg_catalog.pg_get_partkeydef({rel})",
        oid,
    )
}

pub fn partitions_query(oid: u32) -> Query {
    by_oid(
        "describe.partitions",
        "SELECT quote_ident(n.nspname) || '.' || quote_ident(c.relname) || ' ' \
         || pg_get_expr(c.relpartbound, c.oid, true) \
         FROM pg_catalog.pg_inherits i \
         INNER JOIN pg_catalog.pg_class c ON c.oid = i.inhrelid \
         INNER JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE i.inhparent = {rel} ORDER BY 1",
        oid,
    )
}

pub fn foreign_table_query(oid: u32) -> Query {
    by_oid(
        "describe.foreign_table",
        "SELECT s.srvname::text, \
         array_to_string(ARRAY(SELECT quote_ident(option_name) || ' ' || quote_literal(option_value) \
         FROM pg_options_to_table(ftoptions)), ', ') \
         FROM pg_catalog.pg_foreign_table f, pg_catalog.pg_foreign_server s \
         WHERE f.ftrelid = {rel} AND s.oid = f.ftserver",
        oid,
    )
}

pub fn inherits_query(oid: u32) -> Query {
    by_oid(
        "describe.inherits",
        "SELECT c.oid::pg_catalog.regclass::text \
         FROM pg_catalog.pg_class c, pg_catalog.pg_inherits i \
         WHERE c.oid = i.inhparent AND i.inhrelid = {rel} ORDER BY inhseqno",
        oid,
    )
}

pub fn child_tables_query(oid: u32) -> Query {
    by_oid(
        "describe.child_tables",
        "SELECT c.oid::pg_catalog.regclass::text \
         FROM pg_catalog.pg_class c, pg_catalog.pg_inherits i \
         WHERE c.oid = i.inhrelid AND i.inhparent = {rel} \
         ORDER BY c.oid::pg_catalog.regclass::pg_catalog.text",
        oid,
    )
}

/// Assemble the footer for one relation
pub(crate) async fn collect(
    ctx: &ExecContext,
    db: &dyn Queryer,
    info: &TableInfo,
    schema: &str,
    verbose: bool,
) -> Result<FooterSections> {
    let mut footer = FooterSections::default();
    let oid = info.oid;
    let kind = info.kind;

    if kind.is_view() && verbose {
        footer.view_definition = view_definition(ctx, db, oid).await?;
    }

    match kind {
        RelKind::Index | RelKind::PartitionedIndex => {
            footer.index_summary = Some(index_summary(ctx, db, oid, schema).await?);
        }
        RelKind::Sequence => {
            footer.owned_by = single_text(ctx, db, &sequence_owner_query(oid)).await?;
        }
        RelKind::Table
        | RelKind::PartitionedTable
        | RelKind::MaterializedView
        | RelKind::ForeignTable => {
            if info.has_index {
                footer.indexes = indexes(ctx, db, oid).await?;
            }
            if info.check_count > 0 {
                footer.check_constraints = named_definitions(ctx, db, &check_constraints_query(oid)).await?;
            }
            // Foreign keys are looked up only when the relation has triggers.
            if info.has_triggers {
                footer.foreign_keys = named_definitions(ctx, db, &foreign_keys_query(oid)).await?;
                footer.referenced_by = referenced_by(ctx, db, oid).await?;
            }
            if info.has_rules && kind != RelKind::MaterializedView {
                footer.rules = firing_groups(ctx, db, &rules_query(oid), |def| def).await?;
            }
            if info.is_partition {
                let label = "describe.partition_of";
                let result = ctx.run(db, &partition_of_query(oid)).await?;
                for row in &result.rows {
                    footer.partition_of.push(row.opt_text(label, 0)?.unwrap_or_default());
                    footer
                        .partition_constraints
                        .push(row.opt_text(label, 1)?.unwrap_or_default());
                }
            }
            if kind == RelKind::PartitionedTable {
                footer.partition_key = single_text(ctx, db, &partition_key_query(oid)).await?;
                let partitions = text_column(ctx, db, &partitions_query(oid)).await?;
                if verbose {
                    footer.partitions = partitions;
                } else {
                    footer.partitions_summary = Some(format!(
                        "Number of partitions: {} (Use \\d+ to list them.)",
                        partitions.len()
                    ));
                }
            }
        }
        RelKind::View | RelKind::CompositeType | RelKind::Toast | RelKind::Other(_) => {}
    }

    if info.has_triggers {
        footer.triggers = firing_groups(ctx, db, &triggers_query(oid), trigger_body).await?;
    }

    if kind.shows_inheritance() {
        if kind == RelKind::ForeignTable {
            let label = "describe.foreign_table";
            if let Some(row) = ctx.run_opt(db, &foreign_table_query(oid)).await? {
                footer.server = Some(row.text(label, 0)?);
                footer.fdw_options = row
                    .opt_text(label, 1)?
                    .filter(|opts| !opts.is_empty())
                    .map(|opts| format!("({})", opts));
            }
        }
        if !info.is_partition {
            footer.inherits = text_column(ctx, db, &inherits_query(oid)).await?;
            let children = text_column(ctx, db, &child_tables_query(oid)).await?;
            if verbose {
                footer.child_tables = children;
            } else if !children.is_empty() {
                footer.child_tables_summary = Some(format!(
                    "Number of child tables: {} (Use \\d+ to list them.)",
                    children.len()
                ));
            }
        }
        footer.typed_table_of = info.of_type.clone();
    }

    if verbose {
        footer.options = info.options.clone().filter(|o| !o.is_empty());
    }

    Ok(footer)
}

/// View definition; lookup failures leave the section absent
async fn view_definition(ctx: &ExecContext, db: &dyn Queryer, oid: u32) -> Result<Option<String>> {
    match single_text(ctx, db, &view_definition_query(oid)).await {
        Ok(def) => Ok(def),
        Err(e @ (Error::Cancelled | Error::Timeout(_))) => Err(e),
        Err(e) => {
            warn!(oid, error = %e, "view definition unavailable");
            Ok(None)
        }
    }
}

async fn index_summary(ctx: &ExecContext, db: &dyn Queryer, oid: u32, schema: &str) -> Result<String> {
    let label = "describe.index_footer";
    let row = ctx.run_one(db, &index_footer_query(oid)).await?;

    let unique = row.boolean(label, 0)?;
    let primary = row.boolean(label, 1)?;
    let clustered = row.boolean(label, 2)?;
    let valid = row.boolean(label, 3)?;
    let deferrable = row.opt_boolean(label, 4)?.unwrap_or(false);
    let deferred = row.opt_boolean(label, 5)?.unwrap_or(false);

    let mut parts = Vec::new();
    if primary {
        parts.push("primary key".to_string());
    } else if unique {
        parts.push("unique".to_string());
    }
    parts.push(row.text(label, 6)?);
    parts.push(format!("for table \"{}.{}\"", schema, row.text(label, 7)?));
    if let Some(pred) = row.opt_text(label, 8)? {
        parts.push(format!("predicate ({})", pred));
    }
    if clustered {
        parts.push("clustered".into());
    }
    if !valid {
        parts.push("invalid".into());
    }
    if deferrable {
        parts.push("deferrable".into());
    }
    if deferred {
        parts.push("initially deferred".into());
    }
    Ok(parts.join(", "))
}

async fn indexes(ctx: &ExecContext, db: &dyn Queryer, oid: u32) -> Result<Vec<String>> {
    let label = "describe.indexes";
    let result = ctx.run(db, &indexes_query(oid)).await?;

    let mut entries = Vec::with_capacity(result.len());
    for row in &result.rows {
        let mut entry = format!("\"{}\"", row.text(label, 0)?);
        let primary = row.boolean(label, 1)?;
        let unique = row.boolean(label, 2)?;
        let clustered = row.boolean(label, 3)?;
        let valid = row.boolean(label, 4)?;
        let index_def = row.opt_text(label, 5)?.unwrap_or_default();
        let constraint_def = row.opt_text(label, 6)?;
        let contype = row.opt_text(label, 7)?;

        if contype.as_deref() == Some("x") {
            entry.push(' ');
            entry.push_str(constraint_def.as_deref().unwrap_or_default());
        } else {
            if primary {
                entry.push_str(" PRIMARY KEY,");
            } else if unique {
                if contype.as_deref() == Some("u") {
                    entry.push_str(" UNIQUE CONSTRAINT,");
                } else {
                    entry.push_str(" UNIQUE,");
                }
            }
            if let Some(pos) = index_def.find(" USING ") {
                entry.push(' ');
                entry.push_str(&index_def[pos + " USING ".len()..]);
            }
            if row.opt_boolean(label, 8)?.unwrap_or(false) {
                entry.push_str(" DEFERRABLE");
            }
            if row.opt_boolean(label, 9)?.unwrap_or(false) {
                entry.push_str(" INITIALLY DEFERRED");
            }
        }
        if clustered {
            entry.push_str(" CLUSTER");
        }
        if !valid {
            entry.push_str(" INVALID");
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// `"conname" DEFINITION` rows
async fn named_definitions(ctx: &ExecContext, db: &dyn Queryer, query: &Query) -> Result<Vec<String>> {
    let label = query.label();
    let result = ctx.run(db, query).await?;
    result
        .rows
        .iter()
        .map(|row| Ok(format!("\"{}\" {}", row.text(label, 0)?, row.opt_text(label, 1)?.unwrap_or_default())))
        .collect()
}

async fn referenced_by(ctx: &ExecContext, db: &dyn Queryer, oid: u32) -> Result<Vec<String>> {
    let query = referenced_by_query(oid);
    let label = query.label();
    let result = ctx.run(db, &query).await?;
    result
        .rows
        .iter()
        .map(|row| {
            Ok(format!(
                "TABLE \"{}\" CONSTRAINT \"{}\" {}",
                row.text(label, 0)?,
                row.text(label, 1)?,
                row.opt_text(label, 2)?.unwrap_or_default()
            ))
        })
        .collect()
}

/// Rows of `(name, definition, firing code)` grouped by firing mode
async fn firing_groups(
    ctx: &ExecContext,
    db: &dyn Queryer,
    query: &Query,
    shape: fn(String) -> String,
) -> Result<FiringGroups> {
    let label = query.label();
    let result = ctx.run(db, query).await?;
    let mut groups = FiringGroups::default();
    for row in &result.rows {
        let definition = row.opt_text(label, 1)?.unwrap_or_default();
        let code = row.opt_text(label, 2)?.unwrap_or_default();
        if let Some(mode) = FiringMode::from_code(&code) {
            groups.push(mode, shape(definition));
        }
    }
    Ok(groups)
}

/// Text after ` TRIGGER ` in a trigger definition
pub fn trigger_body(definition: String) -> String {
    match definition.find(" TRIGGER ") {
        Some(pos) => definition[pos + " TRIGGER ".len()..].to_string(),
        None => definition,
    }
}

/// First column of the first row; no row means absent
async fn single_text(ctx: &ExecContext, db: &dyn Queryer, query: &Query) -> Result<Option<String>> {
    match ctx.run_opt(db, query).await? {
        Some(row) => row.opt_text(query.label(), 0),
        None => Ok(None),
    }
}

/// First column of every row, nulls skipped
async fn text_column(ctx: &ExecContext, db: &dyn Queryer, query: &Query) -> Result<Vec<String>> {
    let label = query.label();
    let result = ctx.run(db, query).await?;
    let mut out = Vec::with_capacity(result.len());
    for row in &result.rows {
        if let Some(text) = row.opt_text(label, 0)? {
            out.push(text);
        }
    }
    Ok(out)
}
