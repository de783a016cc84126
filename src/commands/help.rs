//! `\?` - list the registered meta-commands

use std::sync::Arc;

use async_trait::async_trait;

use crate::command::{CommandDescriptor, Handler, Registry, SpecialResult};
use crate::error::Result;
use crate::query::{ExecContext, QueryResult, Queryer, Row, Value};

const SYNTAX: &str = "\\?";
const DESCRIPTION: &str = "Show commands.";

/// Register `\?`. The help text is taken from the commands registered so
/// far, so this must run after every other module.
pub fn register(registry: &mut Registry) {
    let mut entries: Vec<(String, String)> = registry
        .descriptors()
        .iter()
        .map(|d| (d.syntax.clone(), d.description.clone()))
        .collect();
    entries.push((SYNTAX.to_string(), DESCRIPTION.to_string()));

    registry.register(CommandDescriptor::new(
        "\\?",
        SYNTAX,
        DESCRIPTION,
        Arc::new(Help { entries }),
    ));
}

/// Answers from a fixed table; runs no query
pub struct Help {
    entries: Vec<(String, String)>,
}

#[async_trait]
impl Handler for Help {
    async fn handle(
        &self,
        _ctx: &ExecContext,
        _db: &dyn Queryer,
        _args: &str,
        _verbose: bool,
    ) -> Result<SpecialResult> {
        let rows = self
            .entries
            .iter()
            .map(|(syntax, description)| {
                Row::new(vec![
                    Value::from(syntax.as_str()),
                    Value::from(description.as_str()),
                ])
            })
            .collect();
        Ok(SpecialResult::Rows(QueryResult::new(
            vec!["Command".to_string(), "Description".to_string()],
            rows,
        )))
    }
}
