pub mod address;

pub use address::{AddressConfig, AddressKind, Bech32Prefixes};

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{parser::ValueSource, ArgMatches, ValueEnum};
use tracing::debug;

use crate::{cli::flags, Error, Result};

pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE: &str = "config.toml";

/// Keys understood in `config/config.toml`.
pub const CONFIG_KEYS: [&str; 8] = [
    flags::FLAG_CHAIN_ID,
    flags::FLAG_NODE,
    flags::FLAG_OUTPUT,
    flags::FLAG_ENCODING,
    flags::FLAG_TRUST_NODE,
    flags::FLAG_INDENT,
    flags::FLAG_TRACE,
    flags::FLAG_BROADCAST_MODE,
];

pub const BOOL_CONFIG_KEYS: [&str; 3] = [flags::FLAG_TRUST_NODE, flags::FLAG_INDENT, flags::FLAG_TRACE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Binary encoding used when bytes are shown to or read from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Encoding {
    #[default]
    Hex,
    B64,
    Btc,
}

impl Encoding {
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(bytes),
            Encoding::B64 => STANDARD.encode(bytes),
            Encoding::Btc => bs58::encode(bytes).into_string(),
        }
    }

    pub fn decode(&self, data: &str) -> Result<Vec<u8>> {
        let data = data.trim();
        Ok(match self {
            Encoding::Hex => hex::decode(data)?,
            Encoding::B64 => STANDARD.decode(data)?,
            Encoding::Btc => bs58::decode(data).into_vec()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BroadcastMode {
    #[default]
    Sync,
    Async,
    Block,
}

impl BroadcastMode {
    pub fn rpc_method(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "broadcast_tx_sync",
            BroadcastMode::Async => "broadcast_tx_async",
            BroadcastMode::Block => "broadcast_tx_commit",
        }
    }
}

/// Settings resolved once per invocation and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub home: PathBuf,
    pub chain_id: Option<String>,
    pub node: String,
    pub output: OutputFormat,
    pub encoding: Encoding,
    pub trust_node: bool,
    pub indent: bool,
    pub trace: bool,
    pub broadcast_mode: BroadcastMode,
}

impl Settings {
    pub fn keys_dir(&self) -> PathBuf {
        self.home.join("keys")
    }

    /// Chain id for signing; signing without one would produce a tx no chain accepts.
    pub fn require_chain_id(&self) -> Result<&str> {
        match self.chain_id.as_deref() {
            Some(chain_id) if !chain_id.is_empty() => Ok(chain_id),
            _ => Err(Error::CustomError(format!(
                "--{} is required, set it with a flag or `nscli config chain-id <id>`",
                flags::FLAG_CHAIN_ID
            ))),
        }
    }
}

pub fn config_file(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Reads `<home>/config/config.toml` if present. A missing file yields an empty table.
pub fn read_config_file(home: &Path) -> Result<toml::Table> {
    let path = config_file(home);
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(toml::Table::new());
    }

    let content = fs::read_to_string(&path)?;
    content
        .parse::<toml::Table>()
        .map_err(|source| Error::ConfigParse { path, source })
}

pub fn write_config_file(home: &Path, table: &toml::Table) -> Result<()> {
    let path = config_file(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, toml::to_string_pretty(table)?)?;
    Ok(())
}

/// Pre-run hook: merges the config file under `--home` with the persistent flags.
///
/// A flag that was set on the command line or through its `NS_*` variable wins over
/// the file, the file wins over the flag default.
pub fn init_config(matches: &ArgMatches) -> Result<Settings> {
    let home = matches
        .try_get_one::<PathBuf>(flags::FLAG_HOME)
        .map_err(|_| Error::FlagBinding(flags::FLAG_HOME.to_owned()))?
        .filter(|home| !home.as_os_str().is_empty())
        .cloned()
        .ok_or(Error::MissingHome)?;

    let file = read_config_file(&home)?;

    let chain_id = bind(matches, flags::FLAG_CHAIN_ID, file_string(&file, flags::FLAG_CHAIN_ID)?)?
        .filter(|chain_id| !chain_id.is_empty());
    let encoding = bind(matches, flags::FLAG_ENCODING, file_enum(&file, flags::FLAG_ENCODING)?)?
        .unwrap_or_default();
    let output = bind(matches, flags::FLAG_OUTPUT, file_enum(&file, flags::FLAG_OUTPUT)?)?
        .unwrap_or_default();
    let node = bind(matches, flags::FLAG_NODE, file_string(&file, flags::FLAG_NODE)?)?
        .unwrap_or_else(|| flags::DEFAULT_NODE.to_owned());
    let trust_node = bind(matches, flags::FLAG_TRUST_NODE, file_bool(&file, flags::FLAG_TRUST_NODE)?)?
        .unwrap_or(false);
    let indent = bind(matches, flags::FLAG_INDENT, file_bool(&file, flags::FLAG_INDENT)?)?
        .unwrap_or(false);
    let trace = bind(matches, flags::FLAG_TRACE, file_bool(&file, flags::FLAG_TRACE)?)?
        .unwrap_or(false);
    let broadcast_mode = file_enum(&file, flags::FLAG_BROADCAST_MODE)?.unwrap_or_default();

    let settings = Settings {
        home,
        chain_id,
        node,
        output,
        encoding,
        trust_node,
        indent,
        trace,
        broadcast_mode,
    };
    debug!(?settings, "settings loaded");

    Ok(settings)
}

fn bind<T>(matches: &ArgMatches, flag: &str, file_value: Option<T>) -> Result<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let flag_value = matches
        .try_get_one::<T>(flag)
        .map_err(|_| Error::FlagBinding(flag.to_owned()))?
        .cloned();

    let explicit = matches!(
        matches.value_source(flag),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    );

    Ok(if explicit {
        flag_value
    } else {
        file_value.or(flag_value)
    })
}

fn file_string(file: &toml::Table, key: &str) -> Result<Option<String>> {
    match file.get(key) {
        None => Ok(None),
        Some(toml::Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(Error::ConfigValue {
            key: key.to_owned(),
            reason: format!("expected a string, found {}", other.type_str()),
        }),
    }
}

fn file_bool(file: &toml::Table, key: &str) -> Result<Option<bool>> {
    match file.get(key) {
        None => Ok(None),
        Some(toml::Value::Boolean(value)) => Ok(Some(*value)),
        Some(toml::Value::String(value)) => value.parse().map(Some).map_err(|_| Error::ConfigValue {
            key: key.to_owned(),
            reason: format!("{value:?} is not a boolean"),
        }),
        Some(other) => Err(Error::ConfigValue {
            key: key.to_owned(),
            reason: format!("expected a boolean, found {}", other.type_str()),
        }),
    }
}

fn file_enum<T: ValueEnum>(file: &toml::Table, key: &str) -> Result<Option<T>> {
    file_string(file, key)?
        .map(|value| {
            T::from_str(&value, true).map_err(|reason| Error::ConfigValue {
                key: key.to_owned(),
                reason,
            })
        })
        .transpose()
}
