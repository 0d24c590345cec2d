//! Command and flag definitions
//!
//! A [`Command`] is built once while the registry is populated and never
//! changes afterwards. Commands without a handler are groups: running one
//! prints its help.

use crate::cli::invocation::{Context, Invocation};
use crate::error::KbotError;
use std::fmt;

/// Flag names reserved for the built-in help and version switches
const RESERVED_FLAGS: [&str; 2] = ["help", "version"];
const RESERVED_SHORTS: [char; 2] = ['h', 'V'];

/// Signature every command handler implements
pub type HandlerFn = dyn Fn(&Invocation, &mut Context<'_>) -> anyhow::Result<()> + Send + Sync;

/// Declared type of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlagType {
    String,
    Integer,
    /// Presence switch, `false` unless passed
    Boolean,
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

/// A typed flag value
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlagValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl FlagValue {
    #[must_use]
    #[inline]
    pub const fn flag_type(&self) -> FlagType {
        match *self {
            Self::String(_) => FlagType::String,
            Self::Integer(_) => FlagType::Integer,
            Self::Boolean(_) => FlagType::Boolean,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// Declaration of a single `--flag`
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FlagSpec {
    name: String,
    short: Option<char>,
    help: String,
    flag_type: FlagType,
    default: Option<FlagValue>,
    required: bool,
    possible_values: Vec<String>,
}

impl FlagSpec {
    fn new(name: &str, help: &str, flag_type: FlagType) -> Self {
        Self {
            name: name.to_owned(),
            short: None,
            help: help.to_owned(),
            flag_type,
            default: None,
            required: false,
            possible_values: Vec::new(),
        }
    }

    /// A flag taking a string value
    #[must_use]
    #[inline]
    pub fn string(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagType::String)
    }

    /// A flag taking a signed integer value
    #[must_use]
    #[inline]
    pub fn integer(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagType::Integer)
    }

    /// A presence switch
    #[must_use]
    #[inline]
    pub fn boolean(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagType::Boolean)
    }

    #[must_use]
    #[inline]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    #[inline]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    #[inline]
    pub fn default_value(mut self, value: FlagValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict a string flag to a fixed set of values
    #[must_use]
    #[inline]
    pub fn possible_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possible_values = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub const fn short_name(&self) -> Option<char> {
        self.short
    }

    #[must_use]
    #[inline]
    pub fn help(&self) -> &str {
        &self.help
    }

    #[must_use]
    #[inline]
    pub const fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    #[must_use]
    #[inline]
    pub const fn default(&self) -> Option<&FlagValue> {
        self.default.as_ref()
    }

    #[must_use]
    #[inline]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    #[inline]
    pub fn allowed_values(&self) -> &[String] {
        &self.possible_values
    }

    /// Check that the declaration is internally consistent
    fn validate(&self, command: &str) -> Result<(), KbotError> {
        let context = format!("flag '--{}' of \"{command}\"", self.name);

        if !is_valid_flag_name(&self.name) {
            return Err(KbotError::invalid_command(format!(
                "{context}: flag names must start with a letter or digit and contain only letters, digits and '-'"
            )));
        }

        if RESERVED_FLAGS.contains(&self.name.as_str()) {
            return Err(KbotError::invalid_command(format!(
                "{context}: '--{}' is reserved",
                self.name
            )));
        }

        if let Some(short) = self.short
            && (RESERVED_SHORTS.contains(&short) || !short.is_ascii_alphanumeric())
        {
            return Err(KbotError::invalid_command(format!(
                "{context}: short alias '-{short}' is reserved or not alphanumeric"
            )));
        }

        if let Some(default) = self.default.as_ref() {
            if default.flag_type() != self.flag_type {
                return Err(KbotError::invalid_command(format!(
                    "{context}: default value is {} but the flag is {}",
                    default.flag_type(),
                    self.flag_type
                )));
            }
            if self.required {
                return Err(KbotError::invalid_command(format!(
                    "{context}: required flags cannot have a default"
                )));
            }
            if *default == FlagValue::Boolean(true) {
                return Err(KbotError::invalid_command(format!(
                    "{context}: boolean switches always default to false"
                )));
            }
            if !self.possible_values.is_empty() && !self.possible_values.contains(&default.to_string())
            {
                return Err(KbotError::invalid_command(format!(
                    "{context}: default '{default}' is not one of the possible values"
                )));
            }
        }

        if self.flag_type == FlagType::Boolean && self.required {
            return Err(KbotError::invalid_command(format!(
                "{context}: boolean switches cannot be required"
            )));
        }

        if self.flag_type != FlagType::String && !self.possible_values.is_empty() {
            return Err(KbotError::invalid_command(format!(
                "{context}: possible values are only supported on string flags"
            )));
        }

        Ok(())
    }
}

/// A node of the command tree
pub struct Command {
    name: String,
    about: String,
    flags: Vec<FlagSpec>,
    args_name: Option<String>,
    handler: Option<Box<HandlerFn>>,
}

impl Command {
    /// Create a command without flags or handler
    #[must_use]
    #[inline]
    pub fn new(name: &str, about: &str) -> Self {
        Self {
            name: name.to_owned(),
            about: about.to_owned(),
            flags: Vec::new(),
            args_name: None,
            handler: None,
        }
    }

    /// Declare a flag; declaration order is kept for help output
    #[must_use]
    #[inline]
    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Accept any number of positional arguments, shown as `value_name` in help
    #[must_use]
    #[inline]
    pub fn with_args(mut self, value_name: &str) -> Self {
        self.args_name = Some(value_name.to_owned());
        self
    }

    /// Attach the function that runs when this command is executed
    #[must_use]
    #[inline]
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation, &mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub fn about(&self) -> &str {
        &self.about
    }

    #[must_use]
    #[inline]
    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    #[must_use]
    #[inline]
    pub fn find_flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    #[must_use]
    #[inline]
    pub const fn accepts_args(&self) -> bool {
        self.args_name.is_some()
    }

    #[must_use]
    #[inline]
    pub fn args_name(&self) -> Option<&str> {
        self.args_name.as_deref()
    }

    #[must_use]
    #[inline]
    pub fn handler_fn(&self) -> Option<&HandlerFn> {
        self.handler.as_deref()
    }

    /// A command with no handler only prints its help
    #[must_use]
    #[inline]
    pub const fn is_group(&self) -> bool {
        self.handler.is_none()
    }

    /// Check the name and every flag declaration
    ///
    /// # Errors
    ///
    /// Returns `InvalidCommand` if:
    /// - The name is empty, starts with '-' or contains whitespace
    /// - Two flags share a name or short alias
    /// - A flag declaration is inconsistent
    pub fn validate(&self) -> Result<(), KbotError> {
        if !is_valid_name(&self.name) {
            return Err(KbotError::invalid_command(format!(
                "command name '{}' must be non-empty and must not start with '-' or contain whitespace",
                self.name
            )));
        }

        for (index, flag) in self.flags.iter().enumerate() {
            flag.validate(&self.name)?;

            for other in &self.flags[..index] {
                if other.name == flag.name {
                    return Err(KbotError::invalid_command(format!(
                        "flag '--{}' is declared twice on \"{}\"",
                        flag.name, self.name
                    )));
                }
                if flag.short.is_some() && other.short == flag.short {
                    return Err(KbotError::invalid_command(format!(
                        "flags '--{}' and '--{}' of \"{}\" share a short alias",
                        other.name, flag.name, self.name
                    )));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("flags", &self.flags)
            .field("args_name", &self.args_name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.contains(char::is_whitespace)
}

/// `[A-Za-z0-9][A-Za-z0-9-]*`
fn is_valid_flag_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
