pub mod auth;
pub mod bank;
pub mod nameservice;

use tracing::debug;

use crate::{cli::CommandNode, rest::RestServer};

/// What an application module contributes to the client.
pub trait ModuleBasic: Send + Sync {
    fn name(&self) -> &'static str;

    /// Query group mounted under `query`, if any.
    fn query_command(&self) -> Option<CommandNode> {
        None
    }

    /// Tx group mounted under `tx`, if any.
    fn tx_command(&self) -> Option<CommandNode> {
        None
    }

    fn register_rest_routes(&self, _rs: &mut RestServer) {}
}

/// Modules in registration order.
pub struct ModuleBasics {
    modules: Vec<Box<dyn ModuleBasic>>,
}

impl ModuleBasics {
    pub fn new(modules: Vec<Box<dyn ModuleBasic>>) -> Self {
        Self { modules }
    }

    pub fn add_query_commands(&self, query: &mut CommandNode) {
        for module in &self.modules {
            if let Some(command) = module.query_command() {
                debug!(module = module.name(), "adding query commands");
                query.add_command(command);
            }
        }
    }

    pub fn add_tx_commands(&self, tx: &mut CommandNode) {
        for module in &self.modules {
            if let Some(command) = module.tx_command() {
                debug!(module = module.name(), "adding tx commands");
                tx.add_command(command);
            }
        }
    }

    pub fn register_rest_routes(&self, rs: &mut RestServer) {
        for module in &self.modules {
            debug!(module = module.name(), "registering rest routes");
            module.register_rest_routes(rs);
        }
    }
}
