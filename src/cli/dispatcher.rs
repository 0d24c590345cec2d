//! Dispatcher: binds residual arguments to a command's flags and runs it
//!
//! Flag parsing is delegated to a `clap::Command` generated from the
//! declared [`FlagSpec`]s; clap errors are translated into [`KbotError`]s so
//! callers see one error taxonomy. Required flags are checked here rather
//! than by clap so the missing flag can be named exactly.

use crate::cli::command::{Command, FlagSpec, FlagType, FlagValue};
use crate::cli::invocation::{Context, FlagValues, Invocation};
use crate::cli::registry::{CommandId, Registry};
use crate::config::Config;
use crate::error::KbotError;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches};
use std::io::Write;
use tracing::debug;

/// Id of the positional argument list inside generated clap commands
const ARGS_ID: &str = "kbot::args";

/// Owns the read-only command tree and the process configuration
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
    config: Config,
}

impl Dispatcher {
    #[must_use]
    #[inline]
    pub const fn new(registry: Registry, config: Config) -> Self {
        Self { registry, config }
    }

    #[must_use]
    #[inline]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    #[inline]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `args` (program name excluded) and execute the matched command
    ///
    /// # Errors
    ///
    /// Returns an error if resolution, flag parsing or the handler fails
    #[inline]
    pub fn dispatch<S: AsRef<str>>(&self, args: &[S], out: &mut dyn Write) -> Result<()> {
        let resolution = self.registry.resolve(args)?;
        self.execute(resolution.command, &resolution.residual, out)
    }

    /// Parse `residual` against the flags of `id` and run its handler
    ///
    /// `--help` prints the command's help, `--version` on the root prints the
    /// version, and group commands print their help. Otherwise the handler
    /// runs exactly once and its result is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A flag is unknown, ill-typed or missing (`KbotError` usage variants)
    /// - The handler fails (propagated as-is)
    /// - Writing help or version output fails
    #[inline]
    pub fn execute(&self, id: CommandId, residual: &[String], out: &mut dyn Write) -> Result<()> {
        let command = self.registry.command(id);
        let command_path = self.registry.display_path(id);

        let matches = match build_clap_command(&self.registry, id, &self.config, false)
            .try_get_matches_from(residual)
        {
            Ok(matches) => matches,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp => {
                    write!(out, "{}", render_help(&self.registry, id, &self.config))?;
                    return Ok(());
                }
                ErrorKind::DisplayVersion => {
                    writeln!(
                        out,
                        "{} {}",
                        command.name(),
                        self.config.build.version()
                    )?;
                    return Ok(());
                }
                _ => return Err(translate_clap_error(&err, residual, &command_path).into()),
            },
        };

        let flags = bind_flags(command, &matches, &command_path)?;
        let args = positional_args(command, &matches);

        let Some(handler) = command.handler_fn() else {
            debug!("\"{command_path}\" is a command group, printing help");
            write!(out, "{}", render_help(&self.registry, id, &self.config))?;
            return Ok(());
        };

        let invocation = Invocation::new(id, self.registry.path(id), flags, args);
        debug!(
            "Executing \"{command_path}\" with {} flag value(s)",
            invocation.flags.len()
        );
        let mut context = Context::new(&self.config, &self.registry, out);
        handler(&invocation, &mut context)
    }
}

/// Render the help text of `id`, listing its subcommands
#[must_use]
#[inline]
pub fn render_help(registry: &Registry, id: CommandId, config: &Config) -> String {
    build_clap_command(registry, id, config, true)
        .render_help()
        .to_string()
}

/// Generate the clap parser for one command
///
/// Children are only attached for help rendering; parsing never sees them
/// because the registry has already consumed the command path.
fn build_clap_command(
    registry: &Registry,
    id: CommandId,
    config: &Config,
    with_children: bool,
) -> clap::Command {
    let command = registry.command(id);

    let mut cmd = clap::Command::new(command.name().to_owned())
        .bin_name(registry.display_path(id))
        .about(command.about().to_owned())
        .no_binary_name(true)
        .disable_help_subcommand(true)
        .args_override_self(true);

    if id == registry.root() {
        cmd = cmd.version(config.build.version().to_owned());
    }

    for flag in command.flags() {
        cmd = cmd.arg(build_clap_arg(flag));
    }

    if let Some(value_name) = command.args_name() {
        cmd = cmd.arg(
            Arg::new(ARGS_ID)
                .value_name(value_name.to_owned())
                .num_args(0..)
                .action(ArgAction::Append),
        );
    }

    if with_children {
        for (_, child) in registry.children(id) {
            cmd = cmd.subcommand(
                clap::Command::new(child.name().to_owned()).about(child.about().to_owned()),
            );
        }
    }

    cmd
}

fn build_clap_arg(flag: &FlagSpec) -> Arg {
    let mut arg = Arg::new(flag.name().to_owned())
        .long(flag.name().to_owned())
        .help(flag.help().to_owned());

    if let Some(short) = flag.short_name() {
        arg = arg.short(short);
    }

    arg = match flag.flag_type() {
        FlagType::Boolean => arg.action(ArgAction::SetTrue),
        FlagType::Integer => arg
            .action(ArgAction::Set)
            .value_name("INT")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i64)),
        FlagType::String if flag.allowed_values().is_empty() => {
            arg.action(ArgAction::Set).value_name("STRING")
        }
        FlagType::String => arg
            .action(ArgAction::Set)
            .value_name("STRING")
            .value_parser(PossibleValuesParser::new(
                flag.allowed_values().iter().cloned(),
            )),
    };

    if flag.flag_type() != FlagType::Boolean
        && let Some(default) = flag.default()
    {
        arg = arg.default_value(default.to_string());
    }

    arg
}

/// Read typed values for every declared flag out of the clap matches
fn bind_flags(
    command: &Command,
    matches: &ArgMatches,
    command_path: &str,
) -> Result<FlagValues, KbotError> {
    let mut flags = FlagValues::new();

    for flag in command.flags() {
        let name = flag.name();
        let value = match flag.flag_type() {
            FlagType::Boolean => Some(FlagValue::Boolean(matches.get_flag(name))),
            FlagType::Integer => matches
                .try_get_one::<i64>(name)
                .map_err(|e| KbotError::invalid_command(format!("flag '--{name}': {e}")))?
                .copied()
                .map(FlagValue::Integer),
            FlagType::String => matches
                .try_get_one::<String>(name)
                .map_err(|e| KbotError::invalid_command(format!("flag '--{name}': {e}")))?
                .cloned()
                .map(FlagValue::String),
        };

        match value {
            Some(value) => flags.insert(name, value),
            None if flag.is_required() => {
                return Err(KbotError::MissingRequiredFlag {
                    flag: name.to_owned(),
                    command: command_path.to_owned(),
                });
            }
            None => {}
        }
    }

    Ok(flags)
}

fn positional_args(command: &Command, matches: &ArgMatches) -> Vec<String> {
    if !command.accepts_args() {
        return Vec::new();
    }
    matches
        .get_many::<String>(ARGS_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Map a clap parse failure onto the kbot error taxonomy
fn translate_clap_error(err: &clap::Error, residual: &[String], command_path: &str) -> KbotError {
    let invalid_arg = context_text(err, ContextKind::InvalidArg);

    match err.kind() {
        ErrorKind::UnknownArgument => {
            let argument = invalid_arg.unwrap_or_default();
            if argument.len() > 1 && argument.starts_with('-') && !after_terminator(residual, &argument)
            {
                KbotError::UnrecognizedFlag {
                    flag: argument,
                    command: command_path.to_owned(),
                }
            } else {
                KbotError::UnexpectedArgument {
                    argument,
                    command: command_path.to_owned(),
                }
            }
        }
        ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
            let flag = invalid_arg
                .as_deref()
                .and_then(|arg| arg.split_whitespace().next())
                .map(|arg| arg.trim_start_matches('-').to_owned())
                .unwrap_or_default();
            let value = context_text(err, ContextKind::InvalidValue).unwrap_or_default();
            let reason = if value.is_empty() {
                "a value is required".to_owned()
            } else if let Some(valid) = context_text(err, ContextKind::ValidValue) {
                format!("expected one of: {valid}")
            } else {
                std::error::Error::source(err)
                    .map_or_else(|| "invalid value".to_owned(), ToString::to_string)
            };
            KbotError::InvalidFlagValue {
                flag,
                value,
                reason,
            }
        }
        _ => KbotError::usage(first_line(&err.to_string())),
    }
}

/// Whether `argument` only occurs after a `--` terminator, where it is positional
fn after_terminator(residual: &[String], argument: &str) -> bool {
    let Some(terminator) = residual.iter().position(|arg| arg == "--") else {
        return false;
    };
    !residual[..terminator]
        .iter()
        .any(|arg| arg == argument || arg.starts_with(&format!("{argument}=")))
}

fn context_text(err: &clap::Error, kind: ContextKind) -> Option<String> {
    match err.get(kind)? {
        ContextValue::String(value) => Some(value.clone()),
        ContextValue::Strings(values) if values.is_empty() => None,
        ContextValue::Strings(values) => Some(values.join(", ")),
        _ => None,
    }
}

fn first_line(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildInfo, Settings};

    fn dispatcher() -> Dispatcher {
        let mut registry = Registry::new(Command::new("kbot", "Test bot")).unwrap();
        registry
            .register(
                registry.root(),
                Command::new("echo", "Echo arguments")
                    .with_args("WORDS")
                    .flag(FlagSpec::boolean("upper", "Uppercase output").short('u'))
                    .handler(|invocation, ctx| {
                        let line = invocation.args.join(" ");
                        if invocation.get_bool("upper") {
                            writeln!(ctx.out, "{}", line.to_uppercase())?;
                        } else {
                            writeln!(ctx.out, "{line}")?;
                        }
                        Ok(())
                    }),
            )
            .unwrap();
        let config = Config::new(
            BuildInfo::new(Some("v1.0.0-abcdef1"), "linux", "amd64"),
            Settings::default(),
        );
        Dispatcher::new(registry, config)
    }

    fn run(dispatcher: &Dispatcher, args: &[&str]) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = dispatcher.dispatch(args, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_positional_args_and_short_switch() {
        let (result, out) = run(&dispatcher(), &["echo", "-u", "hello", "world"]);
        result.unwrap();
        assert_eq!(out, "HELLO WORLD\n");
    }

    #[test]
    fn test_root_version_flag() {
        let (result, out) = run(&dispatcher(), &["--version"]);
        result.unwrap();
        assert_eq!(out, "kbot v1.0.0-abcdef1\n");
    }

    #[test]
    fn test_help_lists_subcommands() {
        let (result, out) = run(&dispatcher(), &["--help"]);
        result.unwrap();
        assert!(out.contains("Test bot"));
        assert!(out.contains("echo"));
    }

    #[test]
    fn test_group_without_args_prints_help() {
        let (result, out) = run(&dispatcher(), &[]);
        result.unwrap();
        assert!(out.contains("Usage: kbot"));
    }

    #[test]
    fn test_unknown_flag_on_root() {
        let (result, _) = run(&dispatcher(), &["--bogus"]);
        let err = result.unwrap_err();
        let err = err.downcast_ref::<KbotError>().unwrap();
        assert!(matches!(err, KbotError::UnrecognizedFlag { flag, .. } if flag == "--bogus"));
        assert_eq!(err.exit_code(), 2);
    }
}
