pub mod query;
pub mod rest;
mod rpc;

pub use query::{BlockCmd, ValidatorSetCmd};
pub use rpc::{node_url, RpcClient};

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::{
    codec::Codec,
    config::{Bech32Prefixes, OutputFormat, Settings},
    keys::Keyring,
    modules::ModuleBasics,
    Result,
};

/// Everything a command needs, built once before dispatch and never mutated.
#[derive(Clone)]
pub struct ClientContext {
    pub settings: Settings,
    pub prefixes: Bech32Prefixes,
    pub codec: Codec,
    pub modules: Arc<ModuleBasics>,
    http: reqwest::Client,
    keyring: Arc<OnceLock<Keyring>>,
}

impl ClientContext {
    pub fn new(
        settings: Settings,
        prefixes: Bech32Prefixes,
        codec: Codec,
        modules: Arc<ModuleBasics>,
    ) -> Self {
        Self {
            settings,
            prefixes,
            codec,
            modules,
            http: reqwest::Client::new(),
            keyring: Arc::default(),
        }
    }

    pub fn rpc(&self) -> RpcClient {
        RpcClient::new(self.http.clone(), &self.settings.node)
    }

    /// Opens the keyring on first use; later calls share the same database handle.
    pub fn keyring(&self) -> Result<Keyring> {
        if let Some(keyring) = self.keyring.get() {
            return Ok(keyring.clone());
        }
        let keyring = Keyring::open(&self.settings.keys_dir())?;
        Ok(self.keyring.get_or_init(|| keyring).clone())
    }

    /// Whether queries should ask the node for proofs.
    pub fn prove(&self) -> bool {
        !self.settings.trust_node
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self.settings.output {
            OutputFormat::Json if self.settings.indent => serde_json::to_string_pretty(value)?,
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Text => serde_yaml::to_string(value)?.trim_end().to_owned(),
        })
    }

    /// Prints `value` as JSON whatever `--output` says; used for documents meant to be
    /// fed back into other commands.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let bytes = if self.settings.indent {
            self.codec.marshal_json_indent(value)?
        } else {
            self.codec.marshal_json(value)?
        };
        println!("{}", String::from_utf8_lossy(&bytes));
        Ok(())
    }

    pub fn print_output<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", self.render(value)?);
        Ok(())
    }
}
