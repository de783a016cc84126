//! In-memory catalog answering the describe and resolver queries by label

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use regex::Regex;

use pgmeta::error::{Error, Result};
use pgmeta::query::{Query, QueryResult, Queryer, Row, Value};

#[derive(Debug, Clone)]
pub struct FakeColumn {
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default: Option<String>,
    /// Index key expression, for index columns
    pub index_def: Option<String>,
    pub fdw_options: Option<String>,
}

impl FakeColumn {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            not_null: false,
            default: None,
            index_def: None,
            fdw_options: None,
        }
    }

    pub fn index_def(mut self, expr: &str) -> Self {
        self.index_def = Some(expr.to_string());
        self
    }

    pub fn fdw_options(mut self, options: &str) -> Self {
        self.fdw_options = Some(options.to_string());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeRelation {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub kind: char,
    pub columns: Vec<FakeColumn>,
    pub has_triggers: bool,
    pub has_rules: bool,
    pub is_partition: bool,
    /// Rows of `describe.indexes`
    pub indexes: Vec<Vec<Value>>,
    /// `(conname, definition)` pairs
    pub checks: Vec<(String, String)>,
    pub view_definition: Option<String>,
    /// The single row a sequence returns from `SELECT *`
    pub sequence_state: Vec<Value>,
    /// Rows of any other oid-keyed query, by label
    pub answers: HashMap<&'static str, Vec<Vec<Value>>>,
}

impl FakeRelation {
    pub fn new(oid: u32, schema: &str, name: &str, kind: char) -> Self {
        Self {
            oid,
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
            columns: Vec::new(),
            has_triggers: false,
            has_rules: false,
            is_partition: false,
            indexes: Vec::new(),
            checks: Vec::new(),
            view_definition: None,
            sequence_state: Vec::new(),
            answers: HashMap::new(),
        }
    }

    pub fn with_triggers(mut self) -> Self {
        self.has_triggers = true;
        self
    }

    pub fn with_rules(mut self) -> Self {
        self.has_rules = true;
        self
    }

    /// Mark the relation as a partition of some parent
    pub fn as_partition(mut self) -> Self {
        self.is_partition = true;
        self
    }

    /// Text rows returned for `label`
    pub fn answer(self, label: &'static str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| Value::from(*v)).collect())
            .collect();
        self.answer_values(label, rows)
    }

    /// Rows returned for `label`
    pub fn answer_values(mut self, label: &'static str, rows: Vec<Vec<Value>>) -> Self {
        self.answers.insert(label, rows);
        self
    }

    pub fn column(mut self, column: FakeColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, row: Vec<Value>) -> Self {
        self.indexes.push(row);
        self
    }

    pub fn check(mut self, name: &str, definition: &str) -> Self {
        self.checks.push((name.to_string(), definition.to_string()));
        self
    }

    pub fn view_definition(mut self, definition: &str) -> Self {
        self.view_definition = Some(definition.to_string());
        self
    }

    pub fn sequence_state(mut self, values: Vec<Value>) -> Self {
        self.sequence_state = values;
        self
    }
}

/// Fake catalog. Relations in `public` count as visible on the search path.
#[derive(Default)]
pub struct FakeCatalog {
    relations: Vec<FakeRelation>,
    failing: HashSet<&'static str>,
    stalled: HashSet<&'static str>,
    calls: Mutex<Vec<(String, Option<u32>)>>,
    cancels: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(relations: Vec<FakeRelation>) -> Self {
        Self {
            relations,
            ..Self::default()
        }
    }

    /// Queries with this label fail with a driver error
    pub fn failing(mut self, label: &'static str) -> Self {
        self.failing.insert(label);
        self
    }

    /// Queries with this label never complete
    pub fn stalled(mut self, label: &'static str) -> Self {
        self.stalled.insert(label);
        self
    }

    /// Labels queried so far, in order
    pub fn labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Server-side cancel requests received
    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Oids that any query was keyed on
    pub fn oids_seen(&self) -> Vec<u32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, oid)| *oid)
            .collect()
    }

    fn by_oid(&self, query: &Query) -> Option<&FakeRelation> {
        let oid = query.param(0).and_then(Value::as_oid)?;
        self.relations.iter().find(|r| r.oid == oid)
    }

    fn resolve(&self, query: &Query) -> Result<QueryResult> {
        let sql = query.sql();
        let mut kinds: Option<Vec<String>> = None;
        let mut schema_re: Option<Regex> = None;
        let mut name_re: Option<Regex> = None;

        for (i, param) in query.params().iter().enumerate() {
            let placeholder = format!("${}", i + 1);
            match param {
                Value::TextArray(codes) => kinds = Some(codes.clone()),
                Value::String(pattern) => {
                    let re = Regex::new(pattern).map_err(|e| Error::query(query.label(), e))?;
                    if sql.contains(&format!("n.nspname OPERATOR(pg_catalog.~) {}", placeholder)) {
                        schema_re = Some(re);
                    } else if sql.contains(&format!("c.relname OPERATOR(pg_catalog.~) {}", placeholder)) {
                        name_re = Some(re);
                    }
                }
                _ => {}
            }
        }

        let mut matched: Vec<&FakeRelation> = self
            .relations
            .iter()
            .filter(|r| {
                kinds
                    .as_ref()
                    .map_or(true, |k| k.contains(&r.kind.to_string()))
            })
            .filter(|r| match &schema_re {
                Some(re) => re.is_match(&r.schema),
                None => r.schema == "public",
            })
            .filter(|r| name_re.as_ref().map_or(true, |re| re.is_match(&r.name)))
            .collect();
        matched.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        Ok(QueryResult::new(
            vec!["oid".into(), "nspname".into(), "relname".into(), "relkind".into()],
            matched
                .into_iter()
                .map(|r| {
                    Row::new(vec![
                        Value::Oid(r.oid),
                        Value::from(r.schema.as_str()),
                        Value::from(r.name.as_str()),
                        Value::from(r.kind.to_string()),
                    ])
                })
                .collect(),
        ))
    }

    fn table_info(rel: &FakeRelation) -> Row {
        Row::new(vec![
            Value::Integer(rel.checks.len() as i32),
            Value::from(rel.kind.to_string()),
            Value::Boolean(!rel.indexes.is_empty()),
            Value::Boolean(rel.has_rules),
            Value::Boolean(rel.has_triggers),
            Value::from(""),
            Value::from("0"),
            Value::from(""),
            Value::from("p"),
            Value::Boolean(rel.is_partition),
        ])
    }

    fn column_row(column: &FakeColumn) -> Row {
        Row::new(vec![
            Value::from(column.name.as_str()),
            Value::from(column.type_name.as_str()),
            Value::from(column.default.clone()),
            Value::Boolean(column.not_null),
            Value::Null,
            Value::from(""),
            Value::from(""),
            Value::Null,
            Value::from(column.index_def.clone()),
            Value::from(column.fdw_options.clone()),
            Value::from("p"),
            Value::Null,
            Value::Null,
        ])
    }
}

#[async_trait]
impl Queryer for FakeCatalog {
    async fn query(&self, query: &Query) -> Result<QueryResult> {
        let label = query.label();
        let oid = query.param(0).and_then(Value::as_oid);
        self.calls.lock().unwrap().push((label.to_string(), oid));

        if self.stalled.contains(label) {
            return std::future::pending::<Result<QueryResult>>().await;
        }
        if self.failing.contains(label) {
            return Err(Error::query(label, "injected failure"));
        }

        let rows: Vec<Row> = match label {
            "resolve.relations" => return self.resolve(query),
            "describe.table_info" => self.by_oid(query).map(Self::table_info).into_iter().collect(),
            "describe.columns" => self
                .by_oid(query)
                .map(|r| r.columns.iter().map(Self::column_row).collect())
                .unwrap_or_default(),
            "describe.sequence_state" => {
                let sql = query.sql();
                self.relations
                    .iter()
                    .find(|r| r.kind == 'S' && sql.ends_with(&format!(".{}", r.name)))
                    .map(|r| vec![Row::new(r.sequence_state.clone())])
                    .unwrap_or_default()
            }
            "describe.indexes" => self
                .by_oid(query)
                .map(|r| r.indexes.iter().cloned().map(Row::new).collect())
                .unwrap_or_default(),
            "describe.check_constraints" => self
                .by_oid(query)
                .map(|r| {
                    r.checks
                        .iter()
                        .map(|(name, def)| {
                            Row::new(vec![Value::from(name.as_str()), Value::from(def.as_str())])
                        })
                        .collect()
                })
                .unwrap_or_default(),
            "describe.view_definition" => self
                .by_oid(query)
                .and_then(|r| r.view_definition.clone())
                .map(|def| vec![Row::new(vec![Value::from(def)])])
                .unwrap_or_default(),
            _ => self
                .by_oid(query)
                .and_then(|r| r.answers.get(label))
                .map(|rows| rows.iter().cloned().map(Row::new).collect())
                .unwrap_or_default(),
        };

        Ok(QueryResult::new(Vec::new(), rows))
    }

    async fn cancel(&self) -> Result<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A unique-index row as `describe.indexes` returns it
pub fn unique_constraint_index(name: &str, definition: &str, constraint: &str) -> Vec<Value> {
    vec![
        Value::from(name),
        Value::Boolean(false),
        Value::Boolean(true),
        Value::Boolean(false),
        Value::Boolean(true),
        Value::from(definition),
        Value::from(constraint),
        Value::from("u"),
        Value::Boolean(false),
        Value::Boolean(false),
    ]
}
