use clap::{ArgMatches, Args, Command, FromArgMatches};
use futures::future::LocalBoxFuture;

use crate::{client::ClientContext, Result};

/// Executable body of a leaf command. Receives the leaf's own matches.
pub type Action = for<'a> fn(&'a ClientContext, &'a ArgMatches) -> LocalBoxFuture<'a, Result<()>>;

/// A leaf command: its arguments are the derive struct, its body is `run`.
#[allow(async_fn_in_trait)]
pub trait Runnable: Args + FromArgMatches + 'static {
    const NAME: &'static str;
    const ABOUT: &'static str;
    const ALIASES: &'static [&'static str] = &[];

    async fn run(self, ctx: &ClientContext) -> Result<()>;
}

fn run_leaf<'a, R: Runnable>(ctx: &'a ClientContext, matches: &'a ArgMatches) -> LocalBoxFuture<'a, Result<()>> {
    Box::pin(async move { R::from_arg_matches(matches)?.run(ctx).await })
}

/// One node of the command tree. Groups have no action and always require a child.
pub struct CommandNode {
    command: Command,
    children: Vec<CommandNode>,
    action: Option<Action>,
}

impl CommandNode {
    pub fn group(name: &'static str, about: &'static str) -> Self {
        Self {
            command: Command::new(name).about(about),
            children: vec![],
            action: None,
        }
    }

    pub fn leaf<R: Runnable>() -> Self {
        let command = R::augment_args(Command::new(R::NAME))
            .about(R::ABOUT)
            .visible_aliases(R::ALIASES.iter().copied());
        Self {
            command,
            children: vec![],
            action: Some(run_leaf::<R>),
        }
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.command = self.command.visible_alias(alias);
        self
    }

    pub fn add_command(&mut self, child: CommandNode) {
        self.children.push(child);
    }

    pub fn add_commands(&mut self, children: impl IntoIterator<Item = CommandNode>) {
        self.children.extend(children);
    }

    pub fn with_commands(mut self, children: impl IntoIterator<Item = CommandNode>) -> Self {
        self.add_commands(children);
        self
    }

    /// Drops every direct child whose name is in `names`. Matching is exact.
    pub fn remove_commands(&mut self, names: &[&str]) {
        self.children.retain(|child| !names.contains(&child.name()));
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.command.get_visible_aliases().collect()
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|child| child.name() == name)
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(CommandNode::name).collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.action.is_some()
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Builds the clap command for this node and all of its descendants.
    pub fn to_command(&self) -> Command {
        let mut command = self.command.clone();
        if self.action.is_none() {
            command = command
                .subcommand_required(true)
                .arg_required_else_help(true);
        }
        self.children
            .iter()
            .fold(command, |command, child| command.subcommand(child.to_command()))
    }

    /// Follows the matched subcommand chain down to the deepest node.
    pub fn resolve<'a>(&'a self, matches: &'a ArgMatches) -> (&'a CommandNode, &'a ArgMatches) {
        let mut node = self;
        let mut matches = matches;
        while let Some((name, sub_matches)) = matches.subcommand() {
            match node.child(name) {
                Some(child) => {
                    node = child;
                    matches = sub_matches;
                }
                None => break,
            }
        }
        (node, matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Args)]
    struct Echo {
        word: String,
    }

    impl Runnable for Echo {
        const NAME: &'static str = "echo";
        const ABOUT: &'static str = "Print a word";
        const ALIASES: &'static [&'static str] = &["e"];

        async fn run(self, _ctx: &ClientContext) -> Result<()> {
            Ok(())
        }
    }

    fn tree() -> CommandNode {
        CommandNode::group("root", "Root").with_commands([
            CommandNode::group("words", "Word commands")
                .alias("w")
                .with_commands([CommandNode::leaf::<Echo>()]),
            CommandNode::leaf::<Echo>(),
        ])
    }

    #[test]
    fn leaf_carries_name_about_and_aliases() {
        let leaf = CommandNode::leaf::<Echo>();
        assert_eq!(leaf.name(), "echo");
        assert_eq!(
            leaf.to_command().get_about().map(ToString::to_string).as_deref(),
            Some("Print a word")
        );
        assert_eq!(leaf.aliases(), vec!["e"]);
        assert!(leaf.is_leaf());
        assert!(!CommandNode::group("g", "group").is_leaf());
    }

    #[test]
    fn resolve_walks_to_the_matched_leaf() {
        let root = tree();
        let matches = root
            .to_command()
            .try_get_matches_from(["root", "w", "echo", "hello"])
            .unwrap();
        let (node, leaf_matches) = root.resolve(&matches);

        assert_eq!(node.name(), "echo");
        assert!(node.action().is_some());
        assert_eq!(Echo::from_arg_matches(leaf_matches).unwrap().word, "hello");
    }

    #[test]
    fn groups_require_a_subcommand() {
        let root = tree();
        assert!(root.to_command().try_get_matches_from(["root", "words"]).is_err());
    }

    #[test]
    fn remove_commands_is_exact_and_idempotent() {
        let mut root = tree();
        root.remove_commands(&["word"]);
        assert_eq!(root.child_names(), vec!["words", "echo"]);
        root.remove_commands(&["words"]);
        root.remove_commands(&["words"]);
        assert_eq!(root.child_names(), vec!["echo"]);
    }
}
