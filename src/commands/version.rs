//! `kbot version`: print build metadata

use crate::cli::{Command, Context, FlagSpec, FlagValue, Invocation};
use anyhow::{Context as _, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Output format of `kbot version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Machine-readable version report
#[derive(Debug, Serialize)]
struct VersionReport<'a> {
    version: &'a str,
    tag: Option<String>,
    revision: Option<String>,
    dev: bool,
    os: &'a str,
    arch: &'a str,
}

/// Definition of the `version` command
#[must_use]
pub fn command() -> Command {
    let formats = OutputFormat::value_variants()
        .iter()
        .filter_map(ValueEnum::to_possible_value)
        .map(|value| value.get_name().to_owned());

    Command::new("version", "Print version and build target")
        .flag(
            FlagSpec::string("output", "Output format")
                .short('o')
                .possible_values(formats)
                .default_value(FlagValue::String("text".to_owned())),
        )
        .flag(FlagSpec::boolean("short", "Print only the version string"))
        .handler(run)
}

fn run(invocation: &Invocation, ctx: &mut Context<'_>) -> Result<()> {
    let format = invocation
        .get_string("output")
        .map_or(Ok(OutputFormat::Text), |value| {
            OutputFormat::from_str(value, true).map_err(anyhow::Error::msg)
        })?;
    let build = &ctx.config.build;

    match format {
        OutputFormat::Text if invocation.get_bool("short") => {
            writeln!(ctx.out, "{}", build.version())?;
        }
        OutputFormat::Text => {
            writeln!(ctx.out, "kbot {}", build.version())?;
            writeln!(ctx.out, "target: {}", build.target())?;
        }
        OutputFormat::Json => {
            let parts = build.parsed();
            let report = VersionReport {
                version: build.version(),
                tag: parts.as_ref().map(|p| p.tag.clone()),
                revision: parts.as_ref().map(|p| p.revision.clone()),
                dev: build.is_dev(),
                os: build.target_os(),
                arch: build.target_arch(),
            };
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize version report")?;
            writeln!(ctx.out, "{json}")?;
        }
    }

    Ok(())
}
