pub mod flags;
mod node;

pub use node::{Action, CommandNode, Runnable};

use std::{
    ffi::OsString,
    io::{self, Write},
    sync::Arc,
};

use clap::{Args, Command, ValueEnum};
use clap_complete::Shell;
use serde_derive::Serialize;
use tracing::debug;

use crate::{
    app,
    client::{BlockCmd, ClientContext, ValidatorSetCmd},
    config::{self, BroadcastMode, Encoding, OutputFormat, BOOL_CONFIG_KEYS, CONFIG_KEYS},
    keys,
    modules::{
        auth::{self, AccountCmd, QueryTxCmd, QueryTxsCmd},
        bank::{self, SendCmd},
        ModuleBasics,
    },
    rest::RestServerCmd,
    tx::{BroadcastCmd, DecodeCmd, EncodeCmd, MultiSignCmd, SignCmd},
    Error, Result,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The full command tree. Construction is deterministic for a given module list.
pub fn root_command(modules: &ModuleBasics) -> CommandNode {
    CommandNode::group(app::APP_NAME, app::APP_ABOUT).with_commands([
        CommandNode::leaf::<StatusCmd>(),
        CommandNode::leaf::<ConfigCmd>(),
        query_command(modules),
        tx_command(modules),
        CommandNode::leaf::<RestServerCmd>(),
        keys::keys_command(),
        CommandNode::leaf::<VersionCmd>(),
        CommandNode::leaf::<CompletionCmd>(),
    ])
}

pub fn query_command(modules: &ModuleBasics) -> CommandNode {
    let mut query = CommandNode::group("query", "Querying subcommands")
        .alias("q")
        .with_commands([
            CommandNode::leaf::<AccountCmd>(),
            CommandNode::leaf::<ValidatorSetCmd>(),
            CommandNode::leaf::<BlockCmd>(),
            CommandNode::leaf::<QueryTxsCmd>(),
            CommandNode::leaf::<QueryTxCmd>(),
        ]);
    modules.add_query_commands(&mut query);
    query
}

/// Module tx groups named after the auth and bank modules are dropped, whatever they
/// contain; `send`, `sign` and `multisign` are already mounted at the top of `tx`.
pub fn tx_command(modules: &ModuleBasics) -> CommandNode {
    let mut tx = CommandNode::group("tx", "Transactions subcommands").with_commands([
        CommandNode::leaf::<SendCmd>(),
        CommandNode::leaf::<SignCmd>(),
        CommandNode::leaf::<MultiSignCmd>(),
        CommandNode::leaf::<BroadcastCmd>(),
        CommandNode::leaf::<EncodeCmd>(),
        CommandNode::leaf::<DecodeCmd>(),
    ]);
    modules.add_tx_commands(&mut tx);
    tx.remove_commands(&[auth::MODULE_NAME, bank::MODULE_NAME]);
    tx
}

/// The clap command for `root`, with the persistent flags attached.
pub fn build_command(root: &CommandNode) -> Command {
    flags::with_global_flags(root.to_command()).version(VERSION)
}

/// Parses `args`, loads the configuration for the matched command and runs it.
pub async fn execute<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let prefixes = app::sealed_address_config();
    let codec = app::make_codec();
    let modules = Arc::new(app::module_basics());
    let root = root_command(&modules);

    let matches = build_command(&root).try_get_matches_from(args)?;
    let (node, leaf_matches) = root.resolve(&matches);
    let action = node
        .action()
        .ok_or_else(|| Error::CustomError(format!("{} requires a subcommand", node.name())))?;

    let settings = config::init_config(leaf_matches)?;
    let trace = settings.trace;
    debug!(command = node.name(), "dispatching");

    let ctx = ClientContext::new(settings, prefixes, codec, modules);
    let result = action(&ctx, leaf_matches).await;
    if let Err(e) = &result {
        if trace {
            eprintln!("{e:?}");
        }
    }
    result
}

#[derive(Debug, Args)]
pub struct StatusCmd {}

impl Runnable for StatusCmd {
    const NAME: &'static str = "status";
    const ABOUT: &'static str = "Query remote node for status";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&ctx.rpc().status().await?)
    }
}

#[derive(Debug, Args)]
pub struct ConfigCmd {
    #[arg(help = "Config key; prints the whole file when omitted")]
    key: Option<String>,

    #[arg(help = "New value; prints the current value when omitted")]
    value: Option<String>,
}

impl Runnable for ConfigCmd {
    const NAME: &'static str = "config";
    const ABOUT: &'static str = "Create or query an application CLI configuration file";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let home = &ctx.settings.home;
        let mut table = config::read_config_file(home)?;

        let Some(key) = self.key else {
            print!("{}", toml::to_string_pretty(&table)?);
            return Ok(());
        };
        if !CONFIG_KEYS.contains(&key.as_str()) {
            return Err(Error::ConfigValue {
                key,
                reason: "unknown key".to_owned(),
            });
        }

        match self.value {
            None => {
                match table.get(&key) {
                    Some(toml::Value::String(value)) => println!("{value}"),
                    Some(value) => println!("{value}"),
                    None => println!(),
                }
                Ok(())
            }
            Some(value) => {
                set_config_value(&mut table, &key, &value)?;
                config::write_config_file(home, &table)?;
                eprintln!("configuration saved to {}", config::config_file(home).display());
                Ok(())
            }
        }
    }
}

/// Validates `value` for `key` before it reaches the file, so a later run does not
/// fail to load what `config` wrote.
pub fn set_config_value(table: &mut toml::Table, key: &str, value: &str) -> Result<()> {
    let invalid = |reason: String| Error::ConfigValue {
        key: key.to_owned(),
        reason,
    };

    let value = if BOOL_CONFIG_KEYS.contains(&key) {
        toml::Value::Boolean(
            value
                .parse()
                .map_err(|_| invalid(format!("{value:?} is not a boolean")))?,
        )
    } else {
        match key {
            flags::FLAG_OUTPUT => {
                OutputFormat::from_str(value, true).map_err(invalid)?;
            }
            flags::FLAG_ENCODING => {
                Encoding::from_str(value, true).map_err(invalid)?;
            }
            flags::FLAG_BROADCAST_MODE => {
                BroadcastMode::from_str(value, true).map_err(invalid)?;
            }
            _ => {}
        }
        toml::Value::String(value.to_owned())
    };

    table.insert(key.to_owned(), value);
    Ok(())
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    server_name: &'static str,
    client_name: &'static str,
    version: &'static str,
}

#[derive(Debug, Args)]
pub struct VersionCmd {
    #[arg(long, help = "Print long version information")]
    long: bool,
}

impl Runnable for VersionCmd {
    const NAME: &'static str = "version";
    const ABOUT: &'static str = "Print the app version";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        if !self.long {
            println!("{VERSION}");
            return Ok(());
        }
        ctx.print_output(&VersionInfo {
            name: "nameservice",
            server_name: app::SERVER_NAME,
            client_name: app::APP_NAME,
            version: VERSION,
        })
    }
}

#[derive(Debug, Args)]
pub struct CompletionCmd {
    #[arg(long, value_enum, default_value_t = Shell::Bash, help = "Shell to generate the completion script for")]
    shell: Shell,
}

impl Runnable for CompletionCmd {
    const NAME: &'static str = "completion";
    const ABOUT: &'static str = "Generates completion scripts";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        write_completion(self.shell, &ctx.modules, &mut io::stdout());
        Ok(())
    }
}

/// Writes the `shell` completion script for the full command tree to `out`.
pub fn write_completion(shell: Shell, modules: &ModuleBasics, out: &mut impl Write) {
    let mut command = build_command(&root_command(modules));
    clap_complete::generate(shell, &mut command, app::APP_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn assert_unique(node: &CommandNode) {
        let names = node.child_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "duplicate children under {}", node.name());
        node.children().iter().for_each(assert_unique);
    }

    fn shape(node: &CommandNode) -> Vec<String> {
        let mut paths = vec![node.name().to_owned()];
        for child in node.children() {
            paths.extend(shape(child).into_iter().map(|path| format!("{} {path}", node.name())));
        }
        paths
    }

    #[test]
    fn root_children_are_in_declared_order() {
        let root = root_command(&app::module_basics());
        assert_eq!(
            root.child_names(),
            vec!["status", "config", "query", "tx", "rest-server", "keys", "version", "completion"]
        );
        assert_unique(&root);
    }

    #[test]
    fn query_mounts_core_commands_then_modules() {
        let query = query_command(&app::module_basics());
        assert_eq!(
            query.child_names(),
            vec!["account", "tendermint-validator-set", "block", "txs", "tx", "auth", "nameservice"]
        );
        assert_eq!(query.aliases(), vec!["q"]);
        assert_eq!(query.child("tendermint-validator-set").unwrap().aliases(), vec!["validator"]);
    }

    #[test]
    fn tx_drops_auth_and_bank_groups() {
        let mut tx = tx_command(&app::module_basics());
        let expected = vec!["send", "sign", "multisign", "broadcast", "encode", "decode", "nameservice"];
        assert_eq!(tx.child_names(), expected);

        tx.remove_commands(&[auth::MODULE_NAME, bank::MODULE_NAME]);
        assert_eq!(tx.child_names(), expected);
    }

    #[test]
    fn construction_is_deterministic() {
        let first = root_command(&app::module_basics());
        let second = root_command(&app::module_basics());
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn built_command_passes_clap_debug_asserts() {
        build_command(&root_command(&app::module_basics())).debug_assert();
    }

    #[test]
    fn completion_scripts_cover_the_tree() {
        let modules = app::module_basics();
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut out = Vec::new();
            write_completion(shell, &modules, &mut out);
            let script = String::from_utf8(out).unwrap();
            assert!(script.contains(app::APP_NAME), "{shell}: {script}");
            assert!(script.contains("rest-server"), "{shell}");
        }
    }

    #[test]
    fn config_values_are_validated() {
        let mut table = toml::Table::new();
        set_config_value(&mut table, flags::FLAG_TRUST_NODE, "true").unwrap();
        set_config_value(&mut table, flags::FLAG_OUTPUT, "json").unwrap();
        assert_eq!(table.get(flags::FLAG_TRUST_NODE), Some(&toml::Value::Boolean(true)));
        assert_eq!(
            table.get(flags::FLAG_OUTPUT),
            Some(&toml::Value::String("json".to_owned()))
        );

        assert!(set_config_value(&mut table, flags::FLAG_INDENT, "yes please").is_err());
        assert!(set_config_value(&mut table, flags::FLAG_ENCODING, "base32").is_err());
    }
}
