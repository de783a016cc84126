//! Column section of a describe report

use super::TableInfo;
use crate::catalog::RelKind;
use crate::error::Result;
use crate::query::{quote_ident, ExecContext, Query, Queryer, Row, Value};

const COLUMNS: &str = "describe.columns";
const SEQUENCE_STATE: &str = "describe.sequence_state";

/// Column headers for `kind`, in display order
pub fn headers(kind: RelKind, verbose: bool) -> Vec<String> {
    let mut headers = vec!["Column".to_string(), "Type".to_string()];

    if kind.has_modifiers() {
        headers.push("Modifiers".into());
    }

    match kind {
        RelKind::Sequence => headers.push("Value".into()),
        RelKind::Index | RelKind::PartitionedIndex => headers.push("Definition".into()),
        RelKind::ForeignTable => headers.push("FDW Options".into()),
        RelKind::Table
        | RelKind::PartitionedTable
        | RelKind::View
        | RelKind::MaterializedView
        | RelKind::CompositeType
        | RelKind::Toast
        | RelKind::Other(_) => {}
    }

    if verbose {
        headers.push("Storage".into());
        if kind.has_stats_target() {
            headers.push("Stats target".into());
        }
        if kind.has_description() {
            headers.push("Description".into());
        }
    }

    headers
}

/// Attribute query for the relation `oid`
pub fn columns_query(oid: u32, kind: RelKind, verbose: bool) -> Query {
    let mut q = Query::new(COLUMNS);
    let rel = q.bind_placeholder(oid);

    q.push_mut(
        "SELECT a.attname, \
         pg_catalog.format_type(a.atttypid, a.atttypmod), \
         (SELECT substring(pg_catalog.pg_get_expr(d.adbin, d.adrelid, true) for 128) \
          FROM pg_catalog.pg_attrdef d \
          WHERE d.adrelid = a.attrelid AND d.adnum = a.attnum AND a.atthasdef), \
         a.attnotnull, \
         (SELECT c.collname FROM pg_catalog.pg_collation c, pg_catalog.pg_type t \
          WHERE c.oid = a.attcollation AND t.oid = a.atttypid \
          AND a.attcollation <> t.typcollation) AS attcollation, \
         a.attidentity::text, \
         a.attgenerated::text",
    );

    if kind.is_index() {
        q.push_mut(format!(
            ", CASE WHEN a.attnum <= (SELECT i.indnkeyatts FROM pg_catalog.pg_index i \
             WHERE i.indexrelid = {rel}) THEN 'yes' ELSE 'no' END AS is_key\
             , pg_catalog.pg_get_indexdef(a.attrelid, a.attnum, TRUE) AS indexdef"
        ));
    } else {
        q.push_mut(", NULL::text AS is_key, NULL::text AS indexdef");
    }

    if kind == RelKind::ForeignTable {
        q.push_mut(
            ", CASE WHEN attfdwoptions IS NULL THEN '' ELSE '(' || \
             array_to_string(ARRAY(SELECT quote_ident(option_name) || ' ' \
             || quote_literal(option_value) FROM pg_options_to_table(attfdwoptions)), ', ') \
             || ')' END AS attfdwoptions",
        );
    } else {
        q.push_mut(", NULL::text AS attfdwoptions");
    }

    if verbose {
        q.push_mut(", a.attstorage::text");
        if kind.has_stats_target() {
            q.push_mut(
                ", CASE WHEN a.attstattarget = -1 THEN NULL \
                 ELSE a.attstattarget::int4 END AS attstattarget",
            );
        } else {
            q.push_mut(", NULL::int4 AS attstattarget");
        }
        if kind.has_description() {
            q.push_mut(", pg_catalog.col_description(a.attrelid, a.attnum)");
        } else {
            q.push_mut(", NULL::text AS attdescr");
        }
    } else {
        q.push_mut(", NULL::text AS attstorage, NULL::int4 AS attstattarget, NULL::text AS attdescr");
    }

    q.push_mut(format!(
        " FROM pg_catalog.pg_attribute a \
         WHERE a.attrelid = {rel} AND a.attnum > 0 AND NOT a.attisdropped \
         ORDER BY a.attnum"
    ));
    q
}

/// Current state row of a sequence, identifiers quoted
pub fn sequence_state_query(schema: &str, name: &str) -> Query {
    Query::text(
        SEQUENCE_STATE,
        format!("SELECT * FROM {}.{}", quote_ident(schema), quote_ident(name)),
    )
}

/// Human name of an `attstorage` code
pub fn storage_label(code: &str) -> &'static str {
    match code.chars().next() {
        Some('p') => "plain",
        Some('m') => "main",
        Some('x') => "extended",
        Some('e') => "external",
        _ => "???",
    }
}

/// Attribute fields decoded from one `describe.columns` row
#[derive(Debug, Clone, Default)]
struct Attribute {
    name: String,
    type_name: String,
    default: Option<String>,
    not_null: bool,
    collation: Option<String>,
    identity: String,
    generated: String,
    index_def: Option<String>,
    fdw_options: Option<String>,
    storage: Option<String>,
    stats_target: Option<i64>,
    description: Option<String>,
}

impl Attribute {
    fn decode(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.text(COLUMNS, 0)?,
            type_name: row.text(COLUMNS, 1)?,
            default: row.opt_text(COLUMNS, 2)?,
            not_null: row.boolean(COLUMNS, 3)?,
            collation: row.opt_text(COLUMNS, 4)?,
            identity: row.opt_text(COLUMNS, 5)?.unwrap_or_default(),
            generated: row.opt_text(COLUMNS, 6)?.unwrap_or_default(),
            index_def: row.opt_text(COLUMNS, 8)?,
            fdw_options: row.opt_text(COLUMNS, 9)?,
            storage: row.opt_text(COLUMNS, 10)?,
            stats_target: row.opt_int(COLUMNS, 11)?,
            description: row.opt_text(COLUMNS, 12)?,
        })
    }

    /// Space-joined collation, not-null, default and identity modifiers
    fn modifiers(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(collation) = &self.collation {
            parts.push(format!("collate {}", collation));
        }
        if self.not_null {
            parts.push("not null".into());
        }
        let stored = self.generated == "s";
        if let Some(default) = self.default.as_ref().filter(|_| !stored) {
            parts.push(format!("default {}", default));
        }
        match self.identity.as_str() {
            "a" => parts.push("generated always as identity".into()),
            "d" => parts.push("generated by default as identity".into()),
            _ => {
                if let (true, Some(expr)) = (stored, &self.default) {
                    parts.push(format!("generated always as ({}) stored", expr));
                }
            }
        }
        parts.join(" ")
    }
}

/// Build the column grid of a report
pub(crate) async fn collect(
    ctx: &ExecContext,
    db: &dyn Queryer,
    info: &TableInfo,
    schema: &str,
    name: &str,
    verbose: bool,
) -> Result<Vec<Vec<String>>> {
    let kind = info.kind;
    let attributes = ctx.run(db, &columns_query(info.oid, kind, verbose)).await?;

    let sequence_state: Vec<Value> = if kind == RelKind::Sequence {
        ctx.run_opt(db, &sequence_state_query(schema, name))
            .await?
            .map(Row::into_values)
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut rows = Vec::with_capacity(attributes.len());
    for (position, row) in attributes.rows.iter().enumerate() {
        let attr = Attribute::decode(row)?;
        let mut cells = vec![attr.name.clone(), attr.type_name.clone()];

        if kind.has_modifiers() {
            cells.push(attr.modifiers());
        }

        match kind {
            RelKind::Sequence => cells.push(
                sequence_state
                    .get(position)
                    .map(Value::to_string)
                    .unwrap_or_default(),
            ),
            RelKind::Index | RelKind::PartitionedIndex => {
                cells.push(attr.index_def.clone().unwrap_or_default())
            }
            RelKind::ForeignTable => cells.push(attr.fdw_options.clone().unwrap_or_default()),
            RelKind::Table
            | RelKind::PartitionedTable
            | RelKind::View
            | RelKind::MaterializedView
            | RelKind::CompositeType
            | RelKind::Toast
            | RelKind::Other(_) => {}
        }

        if verbose {
            cells.push(
                attr.storage
                    .as_deref()
                    .map(storage_label)
                    .unwrap_or_default()
                    .to_string(),
            );
            if kind.has_stats_target() {
                cells.push(attr.stats_target.map(|t| t.to_string()).unwrap_or_default());
            }
            if kind.has_description() {
                cells.push(attr.description.clone().unwrap_or_default());
            }
        }

        rows.push(cells);
    }

    Ok(rows)
}
