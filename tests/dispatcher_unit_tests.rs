//! Unit tests for flag binding and handler execution

use kbot::cli::{Command, Dispatcher, FlagSpec, FlagValue, Invocation, Registry};
use kbot::config::{BuildInfo, Config, Settings};
use kbot::error::{KbotError, exit_code_of};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Registers `kbot scale` with one required and two optional flags, recording
/// every invocation it receives
fn scale_dispatcher(calls: Arc<AtomicUsize>, seen: Arc<Mutex<Vec<Invocation>>>) -> Dispatcher {
    let mut registry = Registry::new(Command::new("kbot", "Test bot")).unwrap();
    let deploy = registry
        .register(registry.root(), Command::new("deploy", "Deployment commands"))
        .unwrap();
    registry
        .register(
            deploy,
            Command::new("scale", "Scale a deployment")
                .flag(FlagSpec::string("name", "Deployment name").required())
                .flag(
                    FlagSpec::integer("replicas", "Replica count")
                        .short('r')
                        .default_value(FlagValue::Integer(1)),
                )
                .flag(FlagSpec::boolean("dry-run", "Only print the change"))
                .handler(move |invocation, ctx| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    seen.lock().unwrap().push(invocation.clone());
                    writeln!(ctx.out, "scaled")?;
                    Ok(())
                }),
        )
        .unwrap();

    Dispatcher::new(
        registry,
        Config::new(BuildInfo::new(None, "linux", "amd64"), Settings::default()),
    )
}

fn setup() -> (Dispatcher, Arc<AtomicUsize>, Arc<Mutex<Vec<Invocation>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = scale_dispatcher(Arc::clone(&calls), Arc::clone(&seen));
    (dispatcher, calls, seen)
}

#[test]
fn test_handler_runs_exactly_once_with_bound_flags() {
    let (dispatcher, calls, seen) = setup();
    let mut out = Vec::new();

    dispatcher
        .dispatch(
            &["deploy", "scale", "--name", "web", "-r", "3", "--dry-run"],
            &mut out,
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(String::from_utf8(out).unwrap(), "scaled\n");

    let seen = seen.lock().unwrap();
    let invocation = &seen[0];
    assert_eq!(invocation.command_path(), "kbot deploy scale");
    assert_eq!(invocation.get_string("name"), Some("web"));
    assert_eq!(invocation.get_integer("replicas"), Some(3));
    assert!(invocation.get_bool("dry-run"));
    assert!(invocation.args.is_empty());
}

#[test]
fn test_defaults_fill_omitted_flags() {
    let (dispatcher, calls, seen) = setup();

    dispatcher
        .dispatch(&["deploy", "scale", "--name=api"], &mut io::sink())
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].get_integer("replicas"), Some(1));
    assert!(!seen[0].get_bool("dry-run"));
}

#[test]
fn test_repeated_flag_keeps_last_value() {
    let (dispatcher, _, seen) = setup();

    dispatcher
        .dispatch(
            &["deploy", "scale", "--name", "a", "--name", "b"],
            &mut io::sink(),
        )
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0].get_string("name"), Some("b"));
}

#[test]
fn test_missing_required_flag_never_invokes_handler() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(&["deploy", "scale", "-r", "2"], &mut io::sink())
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_ne!(exit_code_of(&err), 0);
    assert!(matches!(
        err.downcast_ref::<KbotError>(),
        Some(KbotError::MissingRequiredFlag { flag, command }) if flag == "name" && command == "kbot deploy scale"
    ));
}

#[test]
fn test_unrecognized_flag() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(&["deploy", "scale", "--name", "web", "--force"], &mut io::sink())
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        err.to_string(),
        "unrecognized flag '--force' for \"kbot deploy scale\""
    );
}

#[test]
fn test_ill_typed_value() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(
            &["deploy", "scale", "--name", "web", "--replicas", "many"],
            &mut io::sink(),
        )
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    match err.downcast_ref::<KbotError>() {
        Some(KbotError::InvalidFlagValue { flag, value, .. }) => {
            assert_eq!(flag, "replicas");
            assert_eq!(value, "many");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unexpected_positional_on_leaf() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(&["deploy", "scale", "--name", "web", "extra"], &mut io::sink())
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(
        err.downcast_ref::<KbotError>(),
        Some(KbotError::UnexpectedArgument { argument, .. }) if argument == "extra"
    ));
}

#[test]
fn test_help_flag_skips_handler() {
    let (dispatcher, calls, _) = setup();
    let mut out = Vec::new();

    dispatcher
        .dispatch(&["deploy", "scale", "--help"], &mut out)
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let help = String::from_utf8(out).unwrap();
    assert!(help.contains("Scale a deployment"));
    assert!(help.contains("--replicas"));
}

#[test]
fn test_group_prints_help_listing_children() {
    let (dispatcher, calls, _) = setup();
    let mut out = Vec::new();

    dispatcher.dispatch(&["deploy"], &mut out).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let help = String::from_utf8(out).unwrap();
    assert!(help.contains("Deployment commands"));
    assert!(help.contains("scale"));
}

#[test]
fn test_handler_errors_are_propagated_verbatim() {
    let mut registry = Registry::new(Command::new("kbot", "")).unwrap();
    registry
        .register(
            registry.root(),
            Command::new("fail", "Always fails")
                .handler(|_, _| Err(KbotError::handler("cluster unreachable").into())),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(
        registry,
        Config::new(BuildInfo::new(None, "linux", "amd64"), Settings::default()),
    );

    let err = dispatcher.dispatch(&["fail"], &mut io::sink()).unwrap_err();
    assert_eq!(err.to_string(), "cluster unreachable");
    assert_eq!(exit_code_of(&err), 1);
}

#[test]
fn test_negative_integers_bind_as_values() {
    let (dispatcher, calls, seen) = setup();

    dispatcher
        .dispatch(
            &["deploy", "scale", "--name", "web", "--replicas", "-1"],
            &mut io::sink(),
        )
        .unwrap();
    dispatcher
        .dispatch(&["deploy", "scale", "--name", "web", "-r", "-5"], &mut io::sink())
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].get_integer("replicas"), Some(-1));
    assert_eq!(seen[1].get_integer("replicas"), Some(-5));
}

#[test]
fn test_trailing_flag_without_value() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(&["deploy", "scale", "--name"], &mut io::sink())
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(exit_code_of(&err), 2);
    match err.downcast_ref::<KbotError>() {
        Some(KbotError::InvalidFlagValue { flag, value, reason }) => {
            assert_eq!(flag, "name");
            assert!(value.is_empty());
            assert_eq!(reason, "a value is required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.to_string().contains("expected one of"));
}

#[test]
fn test_flag_lookalike_after_terminator_is_positional() {
    let (dispatcher, calls, _) = setup();

    let err = dispatcher
        .dispatch(
            &["deploy", "scale", "--name", "web", "--", "--force"],
            &mut io::sink(),
        )
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(
        err.downcast_ref::<KbotError>(),
        Some(KbotError::UnexpectedArgument { argument, command })
            if argument == "--force" && command == "kbot deploy scale"
    ));
}
