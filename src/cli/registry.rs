//! Command registry
//!
//! Commands live in a flat arena indexed by [`CommandId`]; each node keeps
//! its parent and its children in registration order. The root node is the
//! binary itself and is created together with the registry.

use crate::cli::command::Command;
use crate::error::KbotError;
use tracing::debug;

/// Handle to a command inside a [`Registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

#[derive(Debug)]
struct Node {
    command: Command,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
}

/// Result of walking an argument vector down the command tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Resolution {
    /// Deepest command whose path matched
    pub command: CommandId,
    /// Arguments left over after the command path
    pub residual: Vec<String>,
}

/// Static tree of available commands
#[derive(Debug)]
pub struct Registry {
    nodes: Vec<Node>,
}

impl Registry {
    const ROOT: CommandId = CommandId(0);

    /// Create a registry whose root is `root`
    ///
    /// # Errors
    ///
    /// Returns `InvalidCommand` if the root definition is malformed
    #[inline]
    pub fn new(root: Command) -> Result<Self, KbotError> {
        root.validate()?;
        Ok(Self {
            nodes: vec![Node {
                command: root,
                parent: None,
                children: Vec::new(),
            }],
        })
    }

    #[must_use]
    #[inline]
    pub const fn root(&self) -> CommandId {
        Self::ROOT
    }

    /// Insert `command` as a child of `parent`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `parent` does not belong to this registry (`NoSuchCommand`)
    /// - A sibling with the same name exists (`DuplicateCommand`)
    /// - The command definition is malformed (`InvalidCommand`)
    #[inline]
    pub fn register(&mut self, parent: CommandId, command: Command) -> Result<CommandId, KbotError> {
        if parent.0 >= self.nodes.len() {
            return Err(KbotError::NoSuchCommand {
                name: format!("#{}", parent.0),
                parent: self.display_path(Self::ROOT),
            });
        }

        command.validate()?;

        if self.child(parent, command.name()).is_some() {
            return Err(KbotError::DuplicateCommand {
                name: command.name().to_owned(),
                parent: self.display_path(parent),
            });
        }

        let id = CommandId(self.nodes.len());
        debug!(
            "Registering \"{}\" under \"{}\"",
            command.name(),
            self.display_path(parent)
        );
        self.nodes.push(Node {
            command,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);

        Ok(id)
    }

    /// Walk `args` (program name excluded) down the tree
    ///
    /// Descends while arguments name a child command and stops at the first
    /// flag or unknown name. Everything from there on is residual input for
    /// the matched command.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchCommand` when the stopping argument is a bare word, the
    /// matched command has subcommands, and it takes no positional arguments.
    #[inline]
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Resolution, KbotError> {
        let mut current = Self::ROOT;
        let mut consumed = 0;

        for arg in args {
            let arg = arg.as_ref();
            if is_flag(arg) {
                break;
            }
            match self.child(current, arg) {
                Some(child) => {
                    current = child;
                    consumed += 1;
                }
                None => break,
            }
        }

        let residual: Vec<String> = args[consumed..]
            .iter()
            .map(|arg| arg.as_ref().to_owned())
            .collect();

        if let Some(first) = residual.first()
            && !is_flag(first)
            && !self.nodes[current.0].children.is_empty()
            && !self.command(current).accepts_args()
        {
            return Err(KbotError::NoSuchCommand {
                name: first.clone(),
                parent: self.display_path(current),
            });
        }

        debug!(
            "Resolved \"{}\" with {} residual argument(s)",
            self.display_path(current),
            residual.len()
        );

        Ok(Resolution {
            command: current,
            residual,
        })
    }

    /// Look up a command by its path of names below the root
    #[must_use]
    #[inline]
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<CommandId> {
        path.iter()
            .try_fold(Self::ROOT, |id, name| self.child(id, name.as_ref()))
    }

    /// Child of `parent` named `name`
    #[must_use]
    #[inline]
    pub fn child(&self, parent: CommandId, name: &str) -> Option<CommandId> {
        self.nodes
            .get(parent.0)?
            .children
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].command.name() == name)
    }

    /// Children of `id` in registration order
    #[inline]
    pub fn children(&self, id: CommandId) -> impl Iterator<Item = (CommandId, &Command)> {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|child| (*child, &self.nodes[child.0].command))
    }

    /// The command behind `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    #[must_use]
    #[inline]
    pub fn command(&self, id: CommandId) -> &Command {
        &self.nodes[id.0].command
    }

    #[must_use]
    #[inline]
    pub fn parent(&self, id: CommandId) -> Option<CommandId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Names from the root down to `id`, root included
    #[must_use]
    #[inline]
    pub fn path(&self, id: CommandId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            names.push(self.command(node_id).name().to_owned());
            current = self.parent(node_id);
        }
        names.reverse();
        names
    }

    /// Space separated path, e.g. `kbot version`
    #[must_use]
    #[inline]
    pub fn display_path(&self, id: CommandId) -> String {
        self.path(id).join(" ")
    }

    /// Number of registered commands, root included
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root always exists
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// `-` alone is a positional (conventionally stdin)
fn is_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-')
}
