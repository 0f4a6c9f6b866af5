mod cli;
mod query;
pub mod rest;

pub use cli::{AccountCmd, QueryTxCmd, QueryTxsCmd};
pub use query::{
    events_query, parse_events, query_account, query_tx, search_txs, SearchTxsResult, TxResponse,
};

use crate::{
    cli::CommandNode,
    rest::RestServer,
    tx::{MultiSignCmd, SignCmd},
};

use super::ModuleBasic;

pub const MODULE_NAME: &str = "auth";
pub const QUERIER_ROUTE: &str = "acc";

pub struct AppModuleBasic;

impl ModuleBasic for AppModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn query_command(&self) -> Option<CommandNode> {
        Some(
            CommandNode::group(MODULE_NAME, "Querying commands for the auth module")
                .with_commands([CommandNode::leaf::<AccountCmd>()]),
        )
    }

    fn tx_command(&self) -> Option<CommandNode> {
        Some(
            CommandNode::group(MODULE_NAME, "Auth transaction subcommands").with_commands([
                CommandNode::leaf::<SignCmd>(),
                CommandNode::leaf::<MultiSignCmd>(),
            ]),
        )
    }

    fn register_rest_routes(&self, rs: &mut RestServer) {
        rest::register_routes(rs);
    }
}
