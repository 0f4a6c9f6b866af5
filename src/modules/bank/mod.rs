mod cli;
mod rest;

pub use cli::SendCmd;

use serde_derive::{Deserialize, Serialize};

use crate::{
    cli::CommandNode,
    config::Bech32Prefixes,
    rest::RestServer,
    types::{coins_to_string, is_all_positive, Coin},
    Error, Result,
};

use super::ModuleBasic;

pub const MODULE_NAME: &str = "bank";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl MsgSend {
    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        prefixes.validate_account_address(&self.from_address)?;
        prefixes.validate_account_address(&self.to_address)?;
        if !is_all_positive(&self.amount) {
            return Err(Error::InvalidCoins(format!(
                "send amount must be positive, got {:?}",
                coins_to_string(&self.amount)
            )));
        }
        Ok(())
    }
}

pub struct AppModuleBasic;

impl ModuleBasic for AppModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn tx_command(&self) -> Option<CommandNode> {
        Some(
            CommandNode::group(MODULE_NAME, "Bank transaction subcommands")
                .with_commands([CommandNode::leaf::<SendCmd>()]),
        )
    }

    fn register_rest_routes(&self, rs: &mut RestServer) {
        rest::register_routes(rs);
    }
}
