//! Meta-command dispatch
//!
//! Parses `\verb[+] [args]` and runs the registered handler.

use tracing::{debug, span, Instrument, Level};

use super::registry::Registry;
use super::result::SpecialResult;
use crate::error::{Error, Result};
use crate::query::{ExecContext, Queryer};

/// Leading character of every meta-command
pub const COMMAND_PREFIX: char = '\\';

/// Trailing character of a verb that requests verbose output
pub const VERBOSE_SUFFIX: char = '+';

/// Outcome of a dispatch that did not fail
#[derive(Debug)]
pub enum Dispatch {
    /// Input is not a meta-command; the caller should treat it as SQL
    NotSpecial,
    /// A handler ran
    Handled(SpecialResult),
}

/// A parsed meta-command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Verb with the verbose suffix removed
    pub verb: &'a str,
    /// Text after the verb, trimmed
    pub args: &'a str,
    pub verbose: bool,
}

/// Split a meta-command line; `None` when the line is not one
pub fn parse(input: &str) -> Option<ParsedCommand<'_>> {
    if !input.starts_with(COMMAND_PREFIX) {
        return None;
    }

    let raw_verb = input.split_whitespace().next().unwrap_or(input);
    let args = input[raw_verb.len()..].trim();
    let (verb, verbose) = match raw_verb.strip_suffix(VERBOSE_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (raw_verb, false),
    };

    Some(ParsedCommand {
        verb,
        args,
        verbose,
    })
}

/// Runs meta-commands against a registry
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Run `input` if it is a meta-command.
    ///
    /// Returns `Ok(Dispatch::NotSpecial)` for plain SQL. An unknown verb is
    /// `Err(Error::UnknownCommand)`; a handler failure is
    /// `Err(Error::CommandExecution)`. Both report
    /// [`Error::is_special_command`] as true.
    pub async fn execute(
        &self,
        ctx: &ExecContext,
        db: &dyn Queryer,
        input: &str,
    ) -> Result<Dispatch> {
        let Some(command) = parse(input) else {
            return Ok(Dispatch::NotSpecial);
        };

        let descriptor = self
            .registry
            .lookup(command.verb)
            .ok_or_else(|| Error::UnknownCommand(command.verb.to_string()))?;

        debug!(verb = command.verb, verbose = command.verbose, "dispatching meta-command");

        let meta_span = span!(
            Level::DEBUG,
            "meta.command",
            verb = %descriptor.verb,
            verbose = command.verbose,
        );

        descriptor
            .handler
            .handle(ctx, db, command.args, command.verbose)
            .instrument(meta_span)
            .await
            .map(Dispatch::Handled)
            .map_err(|source| Error::CommandExecution {
                command: command.verb.to_string(),
                source: Box::new(source),
            })
    }
}
