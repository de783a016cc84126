//! Describe engine against an in-memory catalog

mod common;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{unique_constraint_index, FakeCatalog, FakeColumn, FakeRelation};
use pgmeta::catalog::{CatalogObjectRef, RelKind};
use pgmeta::describe::{describe, describe_all};
use pgmeta::query::{ExecContext, Value};
use pgmeta::Error;

fn accounts() -> FakeRelation {
    FakeRelation::new(16400, "public", "accounts", 'r')
        .column(FakeColumn::new("id", "integer").not_null())
        .column(FakeColumn::new("email", "text"))
        .column(FakeColumn::new("balance", "numeric").not_null().default("0"))
        .index(unique_constraint_index(
            "accounts_email_key",
            "CREATE UNIQUE INDEX accounts_email_key ON public.accounts USING btree (email)",
            "UNIQUE (email)",
        ))
        .check("accounts_balance_check", "CHECK (balance >= 0::numeric)")
}

fn active_accounts() -> FakeRelation {
    FakeRelation::new(16410, "public", "active_accounts", 'v')
        .column(FakeColumn::new("id", "integer"))
        .view_definition(" SELECT accounts.id\n   FROM accounts;")
}

fn object(rel: &FakeRelation) -> CatalogObjectRef {
    CatalogObjectRef::new(rel.oid, rel.schema.as_str(), rel.name.as_str(), RelKind::from_code(rel.kind))
}

#[tokio::test]
async fn test_table_with_unique_index_and_check() {
    let rel = accounts();
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.title(), "Table \"public.accounts\"");
    assert_eq!(report.column_headers, vec!["Column", "Type", "Modifiers"]);
    assert_eq!(
        report.column_values("Modifiers").unwrap(),
        vec!["not null", "", "not null default 0"]
    );

    assert_eq!(
        report.footer.indexes,
        vec!["\"accounts_email_key\" UNIQUE CONSTRAINT, btree (email)"]
    );
    assert_eq!(
        report.footer.check_constraints,
        vec!["\"accounts_balance_check\" CHECK (balance >= 0::numeric)"]
    );
    assert!(report.footer.foreign_keys.is_empty());
    assert!(report.footer.referenced_by.is_empty());
    assert_eq!(
        report.footer.section_names(),
        vec!["Indexes", "Check constraints"]
    );

    // No triggers, so neither foreign-key direction is queried
    let labels = db.labels();
    assert!(!labels.iter().any(|l| l == "describe.foreign_keys"));
    assert!(!labels.iter().any(|l| l == "describe.referenced_by"));
    assert!(!labels.iter().any(|l| l == "describe.triggers"));
}

#[tokio::test]
async fn test_sequence_value_column() {
    let rel = FakeRelation::new(16420, "public", "order_seq", 'S')
        .column(FakeColumn::new("last_value", "bigint"))
        .column(FakeColumn::new("log_cnt", "bigint"))
        .column(FakeColumn::new("is_called", "boolean"))
        .sequence_state(vec![Value::BigInt(42), Value::BigInt(31), Value::Boolean(true)]);
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.title(), "Sequence \"public.order_seq\"");
    assert_eq!(report.column_headers, vec!["Column", "Type", "Value"]);
    assert_eq!(report.column_values("Value").unwrap(), vec!["42", "31", "t"]);
    assert_eq!(
        db.labels().iter().filter(|l| *l == "describe.sequence_state").count(),
        1
    );
}

#[tokio::test]
async fn test_view_definition_only_when_verbose() {
    let rel = active_accounts();
    let db = FakeCatalog::new(vec![rel.clone()]);
    let ctx = ExecContext::new();

    let plain = describe(&ctx, &db, &object(&rel), false).await.unwrap();
    assert_eq!(plain.footer.view_definition, None);
    assert!(!db.labels().iter().any(|l| l == "describe.view_definition"));

    let verbose = describe(&ctx, &db, &object(&rel), true).await.unwrap();
    assert_eq!(
        verbose.footer.view_definition.as_deref(),
        Some(" SELECT accounts.id\n   FROM accounts;")
    );
    assert_eq!(
        verbose.column_headers,
        vec!["Column", "Type", "Modifiers", "Storage", "Description"]
    );
}

#[tokio::test]
async fn test_view_definition_failure_leaves_section_absent() {
    let rel = active_accounts();
    let db = FakeCatalog::new(vec![rel.clone()]).failing("describe.view_definition");

    let report = describe(&ExecContext::new(), &db, &object(&rel), true)
        .await
        .unwrap();

    assert_eq!(report.footer.view_definition, None);
    assert_eq!(report.rows.len(), 1);
}

#[tokio::test]
async fn test_batch_fails_fast() {
    let first = accounts();
    let last = active_accounts();
    let db = FakeCatalog::new(vec![first.clone(), last.clone()]);
    let missing = CatalogObjectRef::new(99999, "public", "gone", RelKind::Table);

    let err = describe_all(
        &ExecContext::new(),
        &db,
        &[object(&first), missing, object(&last)],
        false,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::QueryExecution { ref label, .. } if label == "describe.table_info"));
    assert!(db.oids_seen().contains(&first.oid));
    assert!(!db.oids_seen().contains(&last.oid));
}

#[tokio::test]
async fn test_failing_section_aborts_report() {
    let rel = accounts();
    let db = FakeCatalog::new(vec![rel.clone()]).failing("describe.check_constraints");

    let err = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QueryExecution { ref label, .. } if label == "describe.check_constraints"));
}

#[tokio::test]
async fn test_cancellation_stops_describe() {
    let rel = accounts();
    let db = FakeCatalog::new(vec![rel.clone()]).stalled("describe.columns");
    let token = CancellationToken::new();
    let ctx = ExecContext::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = describe(&ctx, &db, &object(&rel), false).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, Error::Cancelled));
    assert!(!db.labels().iter().any(|l| l == "describe.indexes"));
    assert_eq!(db.cancels(), 1);
}

#[tokio::test]
async fn test_timeout_applies_per_query() {
    let rel = accounts();
    let db = FakeCatalog::new(vec![rel.clone()]).stalled("describe.indexes");
    let ctx = ExecContext::new().with_timeout(Some(Duration::from_millis(20)));

    let err = describe(&ctx, &db, &object(&rel), false).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert_eq!(db.cancels(), 1);
}

#[tokio::test]
async fn test_stalled_view_definition_still_cancels() {
    let rel = active_accounts();
    let db = FakeCatalog::new(vec![rel.clone()]).stalled("describe.view_definition");
    let ctx = ExecContext::new().with_timeout(Some(Duration::from_millis(20)));

    let err = describe(&ctx, &db, &object(&rel), true).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}

fn has_label(db: &FakeCatalog, label: &str) -> bool {
    db.labels().iter().any(|l| l == label)
}

#[tokio::test]
async fn test_triggers_bring_foreign_keys_and_firing_groups() {
    let rel = FakeRelation::new(16430, "public", "orders", 'r')
        .column(FakeColumn::new("id", "integer").not_null())
        .column(FakeColumn::new("account_id", "integer"))
        .with_triggers()
        .answer(
            "describe.foreign_keys",
            &[&["orders_account_id_fkey", "FOREIGN KEY (account_id) REFERENCES accounts(id)"]],
        )
        .answer(
            "describe.referenced_by",
            &[&[
                "order_lines",
                "order_lines_order_id_fkey",
                "FOREIGN KEY (order_id) REFERENCES orders(id)",
            ]],
        )
        .answer(
            "describe.triggers",
            &[
                &["audit_orders", "CREATE TRIGGER audit_orders AFTER INSERT ON public.orders FOR EACH ROW EXECUTE FUNCTION audit()", "O"],
                &["stamp_orders", "CREATE TRIGGER stamp_orders BEFORE UPDATE ON public.orders FOR EACH ROW EXECUTE FUNCTION stamp()", "D"],
                &["sync_orders", "CREATE TRIGGER sync_orders AFTER DELETE ON public.orders FOR EACH ROW EXECUTE FUNCTION sync()", "A"],
                &["copy_orders", "CREATE TRIGGER copy_orders AFTER INSERT ON public.orders FOR EACH ROW EXECUTE FUNCTION copy()", "R"],
                &["odd_orders", "CREATE TRIGGER odd_orders AFTER INSERT ON public.orders FOR EACH ROW EXECUTE FUNCTION odd()", "?"],
            ],
        );
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();
    let footer = &report.footer;

    assert_eq!(
        footer.foreign_keys,
        vec!["\"orders_account_id_fkey\" FOREIGN KEY (account_id) REFERENCES accounts(id)"]
    );
    assert_eq!(
        footer.referenced_by,
        vec!["TABLE \"order_lines\" CONSTRAINT \"order_lines_order_id_fkey\" FOREIGN KEY (order_id) REFERENCES orders(id)"]
    );
    assert_eq!(
        footer.triggers.enabled,
        vec!["audit_orders AFTER INSERT ON public.orders FOR EACH ROW EXECUTE FUNCTION audit()"]
    );
    assert_eq!(
        footer.triggers.disabled,
        vec!["stamp_orders BEFORE UPDATE ON public.orders FOR EACH ROW EXECUTE FUNCTION stamp()"]
    );
    assert_eq!(
        footer.triggers.always,
        vec!["sync_orders AFTER DELETE ON public.orders FOR EACH ROW EXECUTE FUNCTION sync()"]
    );
    assert_eq!(
        footer.triggers.replica,
        vec!["copy_orders AFTER INSERT ON public.orders FOR EACH ROW EXECUTE FUNCTION copy()"]
    );
    // Unknown firing codes are dropped
    assert_eq!(footer.triggers.len(), 4);

    assert_eq!(
        footer.section_names(),
        vec![
            "Foreign-key constraints",
            "Referenced by",
            "Triggers",
            "Disabled triggers",
            "Triggers firing always",
            "Triggers firing on replica only",
        ]
    );
    for label in ["describe.foreign_keys", "describe.referenced_by", "describe.triggers"] {
        assert!(has_label(&db, label), "{} was not queried", label);
    }
}

#[tokio::test]
async fn test_rules_grouped_by_firing_mode() {
    let rules: &[&[&str]] = &[
        &["log_insert", "CREATE RULE log_insert AS ON INSERT TO public.ledger DO ALSO NOTIFY ledger", "O"],
        &["no_delete", "CREATE RULE no_delete AS ON DELETE TO public.ledger DO INSTEAD NOTHING", "D"],
    ];
    let rel = FakeRelation::new(16440, "public", "ledger", 'r')
        .column(FakeColumn::new("id", "integer"))
        .with_rules()
        .answer("describe.rules", rules);
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(
        report.footer.rules.enabled,
        vec!["CREATE RULE log_insert AS ON INSERT TO public.ledger DO ALSO NOTIFY ledger"]
    );
    assert_eq!(
        report.footer.rules.disabled,
        vec!["CREATE RULE no_delete AS ON DELETE TO public.ledger DO INSTEAD NOTHING"]
    );
    assert_eq!(report.footer.section_names(), vec!["Rules", "Disabled rules"]);
}

#[tokio::test]
async fn test_materialized_view_skips_rules() {
    let rel = FakeRelation::new(16441, "public", "ledger_totals", 'm')
        .column(FakeColumn::new("total", "numeric"))
        .with_rules()
        .answer("describe.rules", &[&["_RETURN", "CREATE RULE \"_RETURN\" AS ON SELECT TO ledger_totals DO INSTEAD SELECT 1", "O"]]);
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.title(), "Materialized view \"public.ledger_totals\"");
    assert!(report.footer.rules.is_empty());
    assert!(!has_label(&db, "describe.rules"));
}

fn events() -> FakeRelation {
    FakeRelation::new(16450, "public", "events", 'p')
        .column(FakeColumn::new("created_at", "date").not_null())
        .answer("describe.partition_key", &[&["RANGE (created_at)"]])
        .answer(
            "describe.partitions",
            &[
                &["public.events_2023 FOR VALUES FROM ('2023-01-01') TO ('2024-01-01')"],
                &["public.events_2024 FOR VALUES FROM ('2024-01-01') TO ('2025-01-01')"],
            ],
        )
}

#[tokio::test]
async fn test_partitioned_table_counts_partitions() {
    let rel = events();
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.title(), "Partitioned table \"public.events\"");
    assert_eq!(report.footer.partition_key.as_deref(), Some("RANGE (created_at)"));
    assert!(report.footer.partitions.is_empty());
    assert_eq!(
        report.footer.partitions_summary.as_deref(),
        Some("Number of partitions: 2 (Use \\d+ to list them.)")
    );
    assert_eq!(report.footer.section_names(), vec!["Partition key", "Partitions"]);
    assert!(!has_label(&db, "describe.inherits"));
}

#[tokio::test]
async fn test_partitioned_table_lists_partitions_when_verbose() {
    let rel = events();
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), true)
        .await
        .unwrap();

    assert_eq!(report.footer.partitions_summary, None);
    assert_eq!(
        report.footer.partitions,
        vec![
            "public.events_2023 FOR VALUES FROM ('2023-01-01') TO ('2024-01-01')",
            "public.events_2024 FOR VALUES FROM ('2024-01-01') TO ('2025-01-01')",
        ]
    );
}

#[tokio::test]
async fn test_partition_shows_parent_without_inheritance() {
    let rel = FakeRelation::new(16451, "public", "events_2023", 'r')
        .column(FakeColumn::new("created_at", "date").not_null())
        .as_partition()
        .answer(
            "describe.partition_of",
            &[&[
                "public.events FOR VALUES FROM ('2023-01-01') TO ('2024-01-01')",
                "((created_at IS NOT NULL) AND (created_at >= '2023-01-01'::date) AND (created_at < '2024-01-01'::date))",
            ]],
        )
        .answer("describe.inherits", &[&["public.events"]]);
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(
        report.footer.partition_of,
        vec!["public.events FOR VALUES FROM ('2023-01-01') TO ('2024-01-01')"]
    );
    assert_eq!(report.footer.partition_constraints.len(), 1);
    assert!(report.footer.inherits.is_empty());
    assert_eq!(
        report.footer.section_names(),
        vec!["Partition of", "Partition constraint"]
    );
    assert!(!has_label(&db, "describe.inherits"));
    assert!(!has_label(&db, "describe.child_tables"));
}

fn cities() -> FakeRelation {
    FakeRelation::new(16460, "public", "cities", 'r')
        .column(FakeColumn::new("name", "text"))
        .answer(
            "describe.child_tables",
            &[&["public.capitals"], &["public.villages"]],
        )
}

#[tokio::test]
async fn test_child_tables_summary_and_list() {
    let rel = cities();
    let db = FakeCatalog::new(vec![rel.clone()]);
    let ctx = ExecContext::new();

    let plain = describe(&ctx, &db, &object(&rel), false).await.unwrap();
    assert!(plain.footer.child_tables.is_empty());
    assert_eq!(
        plain.footer.child_tables_summary.as_deref(),
        Some("Number of child tables: 2 (Use \\d+ to list them.)")
    );

    let verbose = describe(&ctx, &db, &object(&rel), true).await.unwrap();
    assert_eq!(verbose.footer.child_tables_summary, None);
    assert_eq!(verbose.footer.child_tables, vec!["public.capitals", "public.villages"]);
    assert_eq!(verbose.footer.section_names(), vec!["Child tables"]);
}

#[tokio::test]
async fn test_child_lists_its_parents() {
    let rel = FakeRelation::new(16461, "public", "capitals", 'r')
        .column(FakeColumn::new("name", "text"))
        .answer("describe.inherits", &[&["public.cities"]]);
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.footer.inherits, vec!["public.cities"]);
    assert_eq!(report.footer.child_tables_summary, None);
    assert_eq!(report.footer.section_names(), vec!["Inherits"]);
}

fn index_footer_row(unique: bool, primary: bool, clustered: bool, valid: bool, predicate: Option<&str>) -> Vec<Value> {
    vec![
        Value::Boolean(unique),
        Value::Boolean(primary),
        Value::Boolean(clustered),
        Value::Boolean(valid),
        Value::Boolean(true),
        Value::Boolean(true),
        Value::from("btree"),
        Value::from("accounts"),
        Value::from(predicate),
    ]
}

#[tokio::test]
async fn test_index_summary_line() {
    let partial = FakeRelation::new(16470, "public", "accounts_email_key", 'i')
        .column(FakeColumn::new("email", "text").index_def("email"))
        .answer_values(
            "describe.index_footer",
            vec![index_footer_row(true, false, true, false, Some("email IS NOT NULL"))],
        );
    let primary = FakeRelation::new(16471, "public", "accounts_pkey", 'i')
        .column(FakeColumn::new("id", "integer").index_def("id"))
        .answer_values(
            "describe.index_footer",
            vec![index_footer_row(true, true, false, true, None)],
        );
    let db = FakeCatalog::new(vec![partial.clone(), primary.clone()]);
    let ctx = ExecContext::new();

    let report = describe(&ctx, &db, &object(&partial), false).await.unwrap();
    assert_eq!(report.title(), "Index \"public.accounts_email_key\"");
    assert_eq!(report.column_headers, vec!["Column", "Type", "Definition"]);
    assert_eq!(report.rows, vec![vec!["email", "text", "email"]]);
    assert_eq!(
        report.footer.index_summary.as_deref(),
        Some(
            "unique, btree, for table \"public.accounts\", predicate (email IS NOT NULL), \
             clustered, invalid, deferrable, initially deferred"
        )
    );
    assert_eq!(report.footer.section_names(), vec!["Index"]);

    let report = describe(&ctx, &db, &object(&primary), false).await.unwrap();
    assert_eq!(
        report.footer.index_summary.as_deref(),
        Some("primary key, btree, for table \"public.accounts\", deferrable, initially deferred")
    );
}

#[tokio::test]
async fn test_foreign_table_server_and_options() {
    let rel = FakeRelation::new(16480, "public", "remote_films", 'f')
        .column(FakeColumn::new("code", "text").not_null().fdw_options("(column_name 'film_code')"))
        .column(FakeColumn::new("title", "text"))
        .answer(
            "describe.foreign_table",
            &[&["film_server", "schema_name 'archive', table_name 'films'"]],
        );
    let db = FakeCatalog::new(vec![rel.clone()]);

    let report = describe(&ExecContext::new(), &db, &object(&rel), false)
        .await
        .unwrap();

    assert_eq!(report.title(), "Foreign table \"public.remote_films\"");
    assert_eq!(
        report.column_headers,
        vec!["Column", "Type", "Modifiers", "FDW Options"]
    );
    assert_eq!(
        report.column_values("FDW Options").unwrap(),
        vec!["(column_name 'film_code')", ""]
    );
    assert_eq!(report.footer.server.as_deref(), Some("film_server"));
    assert_eq!(
        report.footer.fdw_options.as_deref(),
        Some("(schema_name 'archive', table_name 'films')")
    );
    assert_eq!(report.footer.section_names(), vec!["Server", "FDW options"]);
}
