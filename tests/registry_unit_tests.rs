//! Unit tests for command registration and resolution

use kbot::cli::{Command, CommandId, FlagSpec, Registry};
use kbot::error::KbotError;

struct Tree {
    registry: Registry,
    cluster: CommandId,
    nodes: CommandId,
    pods: CommandId,
    logs: CommandId,
}

fn tree() -> Tree {
    let mut registry = Registry::new(Command::new("kbot", "root")).unwrap();
    let root = registry.root();
    let cluster = registry
        .register(root, Command::new("cluster", "Cluster commands"))
        .unwrap();
    let nodes = registry
        .register(cluster, Command::new("nodes", "List nodes").handler(|_, _| Ok(())))
        .unwrap();
    let pods = registry
        .register(
            root,
            Command::new("pods", "Pod commands").flag(FlagSpec::string("namespace", "").short('n')),
        )
        .unwrap();
    let logs = registry
        .register(
            pods,
            Command::new("logs", "Stream logs")
                .with_args("POD")
                .handler(|_, _| Ok(())),
        )
        .unwrap();
    Tree {
        registry,
        cluster,
        nodes,
        pods,
        logs,
    }
}

#[test]
fn test_every_full_path_resolves_to_itself() {
    let tree = tree();
    let cases: [(&[&str], CommandId); 5] = [
        (&[], tree.registry.root()),
        (&["cluster"], tree.cluster),
        (&["cluster", "nodes"], tree.nodes),
        (&["pods"], tree.pods),
        (&["pods", "logs"], tree.logs),
    ];

    for (path, expected) in cases {
        let resolution = tree.registry.resolve(path).unwrap();
        assert_eq!(resolution.command, expected, "path {path:?}");
        assert!(resolution.residual.is_empty());
        assert_eq!(tree.registry.find(path), Some(expected));
    }
}

#[test]
fn test_flag_stops_descent() {
    let tree = tree();
    let resolution = tree
        .registry
        .resolve(&["pods", "-n", "default", "logs"])
        .unwrap();
    assert_eq!(resolution.command, tree.pods);
    assert_eq!(resolution.residual, vec!["-n", "default", "logs"]);
}

#[test]
fn test_positional_after_leaf() {
    let tree = tree();
    let resolution = tree
        .registry
        .resolve(&["pods", "logs", "web-0", "--follow"])
        .unwrap();
    assert_eq!(resolution.command, tree.logs);
    assert_eq!(resolution.residual, vec!["web-0", "--follow"]);
}

#[test]
fn test_single_dash_is_not_a_flag() {
    let tree = tree();
    let resolution = tree.registry.resolve(&["pods", "logs", "-"]).unwrap();
    assert_eq!(resolution.command, tree.logs);
    assert_eq!(resolution.residual, vec!["-"]);
}

#[test]
fn test_unknown_name_below_group_fails() {
    let tree = tree();
    let err = tree.registry.resolve(&["cluster", "upgrade"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown command \"upgrade\" for \"kbot cluster\""
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_register_twice_fails_deterministically() {
    let mut tree = tree();
    for _ in 0..3 {
        let err = tree
            .registry
            .register(tree.cluster, Command::new("nodes", "again"))
            .unwrap_err();
        assert!(matches!(err, KbotError::DuplicateCommand { .. }));
        assert_eq!(
            err.to_string(),
            "command \"nodes\" is already registered under \"kbot cluster\""
        );
    }

    let resolution = tree.registry.resolve(&["cluster", "nodes"]).unwrap();
    assert_eq!(resolution.command, tree.nodes);
    assert!(!tree.registry.command(tree.nodes).is_group());
}

#[test]
fn test_register_rejects_invalid_definitions() {
    let mut tree = tree();
    let root = tree.registry.root();

    let err = tree
        .registry
        .register(root, Command::new("--sneaky", ""))
        .unwrap_err();
    assert!(matches!(err, KbotError::InvalidCommand { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_register_rejects_flag_names_clap_cannot_express() {
    let mut tree = tree();
    let root = tree.registry.root();

    for name in ["kbot::args", "a=b", "x,y"] {
        let err = tree
            .registry
            .register(
                root,
                Command::new("c", "")
                    .with_args("A")
                    .flag(FlagSpec::string(name, "")),
            )
            .unwrap_err();
        assert!(matches!(err, KbotError::InvalidCommand { .. }), "{name:?} accepted");
    }
    assert!(tree.registry.child(root, "c").is_none());
}

#[test]
fn test_children_keep_registration_order() {
    let tree = tree();
    let names: Vec<&str> = tree
        .registry
        .children(tree.registry.root())
        .map(|(_, command)| command.name())
        .collect();
    assert_eq!(names, vec!["cluster", "pods"]);
    assert_eq!(tree.registry.len(), 5);
}
