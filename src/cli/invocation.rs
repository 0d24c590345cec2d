//! Per-run invocation state handed to command handlers

use crate::cli::command::FlagValue;
use crate::cli::dispatcher::render_help;
use crate::cli::registry::{CommandId, Registry};
use crate::config::Config;
use std::collections::BTreeMap;
use std::io::Write;

/// Flag values bound for one invocation, keyed by flag name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValues(BTreeMap<String, FlagValue>);

impl FlagValues {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, name: &str, value: FlagValue) {
        self.0.insert(name.to_owned(), value);
    }

    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// A resolved command path with its bound flags and positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Invocation {
    pub command: CommandId,
    pub path: Vec<String>,
    pub flags: FlagValues,
    pub args: Vec<String>,
}

impl Invocation {
    #[must_use]
    #[inline]
    pub const fn new(
        command: CommandId,
        path: Vec<String>,
        flags: FlagValues,
        args: Vec<String>,
    ) -> Self {
        Self {
            command,
            path,
            flags,
            args,
        }
    }

    /// Space separated command path, e.g. `kbot version`
    #[must_use]
    #[inline]
    pub fn command_path(&self) -> String {
        self.path.join(" ")
    }

    /// Value of a string flag, if bound
    #[must_use]
    #[inline]
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Value of an integer flag, if bound
    #[must_use]
    #[inline]
    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.flags.get(name) {
            Some(FlagValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Value of a boolean switch; unbound switches read as `false`
    #[must_use]
    #[inline]
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.flags.get(name), Some(FlagValue::Boolean(true)))
    }
}

/// What a handler can reach while it runs
#[non_exhaustive]
pub struct Context<'a> {
    pub config: &'a Config,
    pub registry: &'a Registry,
    pub out: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    #[must_use]
    #[inline]
    pub fn new(config: &'a Config, registry: &'a Registry, out: &'a mut dyn Write) -> Self {
        Self {
            config,
            registry,
            out,
        }
    }

    /// Rendered help text for any command in the tree
    #[must_use]
    #[inline]
    pub fn help_for(&self, id: CommandId) -> String {
        render_help(self.registry, id, self.config)
    }
}
