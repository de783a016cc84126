//! Command module
//!
//! This module contains the command registry, the dispatcher that parses
//! meta-command lines, and the result model handlers return.

pub mod dispatch;
pub mod registry;
pub mod result;

pub use dispatch::{parse, Dispatch, Dispatcher, ParsedCommand};
pub use registry::{CommandDescriptor, Handler, Registry};
pub use result::{ExtensionDescription, ResultKind, SpecialResult};
