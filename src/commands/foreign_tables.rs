//! `\dE` - list foreign tables

use std::sync::Arc;

use super::list_objects::ListObjects;
use crate::catalog::RelKind;
use crate::command::{CommandDescriptor, Registry};

pub fn register(registry: &mut Registry) {
    registry.register(CommandDescriptor::new(
        "\\dE",
        "\\dE[+] [pattern]",
        "List foreign tables.",
        Arc::new(ListObjects::new(&[RelKind::ForeignTable])),
    ));
}
