//! Command-line interface module
//!
//! Command model, registry, and dispatcher

pub mod command;
pub mod dispatcher;
pub mod invocation;
pub mod registry;

pub use command::{Command, FlagSpec, FlagType, FlagValue, HandlerFn};
pub use dispatcher::{Dispatcher, render_help};
pub use invocation::{Context, FlagValues, Invocation};
pub use registry::{CommandId, Registry, Resolution};
