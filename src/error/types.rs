//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for kbot operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KbotError {
    /// Configuration Error - missing or invalid runtime configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// No command matches the given path
    #[error("unknown command \"{name}\" for \"{parent}\"")]
    NoSuchCommand { name: String, parent: String },

    /// A flag was passed that the command does not declare
    #[error("unrecognized flag '{flag}' for \"{command}\"")]
    UnrecognizedFlag { flag: String, command: String },

    /// A positional argument was passed to a command that takes none
    #[error("unexpected argument '{argument}' for \"{command}\"")]
    UnexpectedArgument { argument: String, command: String },

    /// A required flag was not supplied
    #[error("missing required flag '--{flag}' for \"{command}\"")]
    MissingRequiredFlag { flag: String, command: String },

    /// A flag value could not be parsed as the declared type
    #[error("invalid value '{value}' for flag '--{flag}': {reason}")]
    InvalidFlagValue {
        flag: String,
        value: String,
        reason: String,
    },

    /// Any other argument parsing failure
    #[error("{message}")]
    Usage { message: String },

    /// A sibling with the same name is already registered
    #[error("command \"{name}\" is already registered under \"{parent}\"")]
    DuplicateCommand { name: String, parent: String },

    /// A command or flag definition is malformed
    #[error("invalid command definition: {message}")]
    InvalidCommand { message: String },

    /// A command handler failed
    #[error("{message}")]
    Handler { message: String },
}

impl KbotError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } | Self::Handler { .. } => 1,
            Self::NoSuchCommand { .. }
            | Self::UnrecognizedFlag { .. }
            | Self::UnexpectedArgument { .. }
            | Self::MissingRequiredFlag { .. }
            | Self::InvalidFlagValue { .. }
            | Self::Usage { .. } => 2,
            Self::DuplicateCommand { .. } | Self::InvalidCommand { .. } => 3,
        }
    }

    /// Whether the error comes from argument resolution or flag parsing
    #[must_use]
    #[inline]
    pub const fn is_usage(&self) -> bool {
        self.exit_code() == 2
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a generic usage error
    #[inline]
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an invalid command definition error
    #[inline]
    pub fn invalid_command<S: Into<String>>(message: S) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }

    /// Create a handler error
    #[inline]
    pub fn handler<S: Into<String>>(message: S) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}

/// Exit code for an arbitrary error, falling back to 1
#[must_use]
#[inline]
pub fn exit_code_of(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<KbotError>()
        .map_or(1, KbotError::exit_code)
}
