//! Built-in meta-commands
//!
//! Every module exposes `register`, and [`register_all`] is the single
//! bootstrap routine that fills a [`Registry`]. Most list commands are a
//! static template wrapped in [`PatternQuery`].

pub mod databases;
pub mod datatypes;
pub mod default_privileges;
pub mod describe;
pub mod domains;
pub mod extensions;
pub mod foreign_tables;
pub mod function_definition;
pub mod functions;
pub mod help;
pub mod list_objects;
pub mod privileges;
pub mod roles;
pub mod schemas;
pub mod tablespaces;

use async_trait::async_trait;
use tracing::info;

use crate::command::{Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::pattern::NamePattern;
use crate::query::{ExecContext, Query, Queryer};

/// Register every built-in command. `\?` goes last so it sees the others.
pub fn register_all(registry: &mut Registry) {
    databases::register(registry);
    schemas::register(registry);
    roles::register(registry);
    privileges::register(registry);
    default_privileges::register(registry);
    tablespaces::register(registry);
    list_objects::register(registry);
    functions::register(registry);
    datatypes::register(registry);
    domains::register(registry);
    extensions::register(registry);
    foreign_tables::register(registry);
    function_definition::register(registry);
    describe::register(registry);
    help::register(registry);

    info!(
        commands = registry.descriptors().len(),
        keys = registry.len(),
        "meta-command registry ready"
    );
}

/// A registry holding every built-in command
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
}

/// A command answered by one query built from the compiled pattern
pub struct PatternQuery {
    build: fn(&NamePattern, bool) -> Query,
}

impl PatternQuery {
    pub fn new(build: fn(&NamePattern, bool) -> Query) -> Self {
        Self { build }
    }
}

#[async_trait]
impl Handler for PatternQuery {
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult> {
        let pattern = ctx.compile_pattern(args)?;
        let query = (self.build)(&pattern, verbose);
        Ok(SpecialResult::Rows(ctx.run(db, &query).await?))
    }
}

/// Schema predicates shared by the list templates.
///
/// With a schema filter, `schema_col` must match it; otherwise `visible` is
/// applied, and when nothing at all is filtered the system schemas are
/// hidden as well.
pub(crate) fn scope(
    q: Query,
    pattern: &NamePattern,
    schema_col: &str,
    visible: &str,
) -> Query {
    let q = match pattern.schema_filter() {
        Some(schema) => q.bind(&format!(" AND {} OPERATOR(pg_catalog.~) ", schema_col), schema),
        None => q.push(format!(" AND {}", visible)),
    };
    q.push_if(
        pattern.is_unfiltered(),
        format!(
            " AND {col} <> 'pg_catalog' AND {col} <> 'information_schema'",
            col = schema_col
        ),
    )
}

/// Bind the name filter against `column`, if there is one
pub(crate) fn name_filter(q: Query, pattern: &NamePattern, column: &str) -> Query {
    match pattern.name_filter() {
        Some(name) => q.bind(&format!(" AND {} OPERATOR(pg_catalog.~) ", column), name),
        None => q,
    }
}
