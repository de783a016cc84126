//! Command registry
//!
//! Maps verbs and aliases to command descriptors. Built once by
//! [`crate::commands::register_all`] and read-only afterwards.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use super::result::SpecialResult;
use crate::error::Result;
use crate::query::{ExecContext, Queryer};

/// A meta-command implementation
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the command. `args` is the text after the verb, trimmed.
    async fn handle(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        args: &str,
        verbose: bool,
    ) -> Result<SpecialResult>;
}

/// Registration record for one command
#[derive(Clone)]
pub struct CommandDescriptor {
    pub verb: String,
    pub aliases: Vec<String>,
    pub case_sensitive: bool,
    pub syntax: String,
    pub description: String,
    pub handler: Arc<dyn Handler>,
}

impl CommandDescriptor {
    /// Case-sensitive descriptor with no aliases
    pub fn new(verb: &str, syntax: &str, description: &str, handler: Arc<dyn Handler>) -> Self {
        Self {
            verb: verb.to_string(),
            aliases: Vec::new(),
            case_sensitive: true,
            syntax: syntax.to_string(),
            description: description.to_string(),
            handler,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    fn normalize(&self, key: &str) -> String {
        if self.case_sensitive {
            key.to_string()
        } else {
            key.to_lowercase()
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("verb", &self.verb)
            .field("aliases", &self.aliases)
            .field("case_sensitive", &self.case_sensitive)
            .field("syntax", &self.syntax)
            .finish()
    }
}

/// Verb/alias lookup table
#[derive(Debug, Default, Clone)]
pub struct Registry {
    commands: IndexMap<String, Arc<CommandDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `descriptor` under its verb and every alias. An existing entry
    /// for the same key is replaced.
    pub fn register(&mut self, descriptor: CommandDescriptor) {
        let descriptor = Arc::new(descriptor);
        let keys = std::iter::once(&descriptor.verb)
            .chain(descriptor.aliases.iter())
            .map(|key| descriptor.normalize(key))
            .collect::<Vec<_>>();
        for key in keys {
            self.commands.insert(key, Arc::clone(&descriptor));
        }
    }

    /// Find the descriptor for `verb`. Case-insensitive commands also match
    /// on the lowercased verb.
    pub fn lookup(&self, verb: &str) -> Option<&Arc<CommandDescriptor>> {
        if let Some(found) = self.commands.get(verb) {
            return Some(found);
        }
        self.commands
            .get(&verb.to_lowercase())
            .filter(|descriptor| !descriptor.case_sensitive)
    }

    /// Distinct descriptors in registration order
    pub fn descriptors(&self) -> Vec<Arc<CommandDescriptor>> {
        let mut seen: Vec<Arc<CommandDescriptor>> = Vec::new();
        for descriptor in self.commands.values() {
            if !seen.iter().any(|d| Arc::ptr_eq(d, descriptor)) {
                seen.push(Arc::clone(descriptor));
            }
        }
        seen
    }

    /// Number of registered keys (verbs plus aliases)
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
