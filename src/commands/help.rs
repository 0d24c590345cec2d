//! `kbot help [command...]`: print help for any command path

use crate::cli::{Command, Context, Invocation};
use crate::error::KbotError;
use anyhow::Result;

/// Definition of the `help` command
#[must_use]
pub fn command() -> Command {
    Command::new("help", "Print help for kbot or one of its commands")
        .with_args("COMMAND")
        .handler(run)
}

fn run(invocation: &Invocation, ctx: &mut Context<'_>) -> Result<()> {
    let registry = ctx.registry;
    let mut target = registry.root();

    for name in &invocation.args {
        target = registry
            .child(target, name)
            .ok_or_else(|| KbotError::NoSuchCommand {
                name: name.clone(),
                parent: registry.display_path(target),
            })?;
    }

    let help = ctx.help_for(target);
    write!(ctx.out, "{help}")?;
    Ok(())
}
