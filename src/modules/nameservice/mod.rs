//! Names that resolve to values, bought and sold for coins.

mod cli;
mod rest;

pub use cli::{BuyNameCmd, DeleteNameCmd, NamesCmd, ResolveCmd, SetNameCmd, WhoisCmd};

use serde_derive::{Deserialize, Serialize};

use crate::{
    cli::CommandNode,
    client::ClientContext,
    config::Bech32Prefixes,
    rest::RestServer,
    types::{coins_to_string, is_all_positive, Coin},
    Error, Result,
};

use super::ModuleBasic;

pub const MODULE_NAME: &str = "nameservice";
pub const QUERY_RESOLVE: &str = "resolve";
pub const QUERY_WHOIS: &str = "whois";
pub const QUERY_NAMES: &str = "names";

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::CustomError("name cannot be empty".to_owned()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBuyName {
    pub name: String,
    pub bid: Vec<Coin>,
    pub buyer: String,
}

impl MsgBuyName {
    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        prefixes.validate_account_address(&self.buyer)?;
        validate_name(&self.name)?;
        if !is_all_positive(&self.bid) {
            return Err(Error::InvalidCoins(format!(
                "bids must be positive, got {:?}",
                coins_to_string(&self.bid)
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSetName {
    pub name: String,
    pub value: String,
    pub owner: String,
}

impl MsgSetName {
    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        prefixes.validate_account_address(&self.owner)?;
        validate_name(&self.name)?;
        if self.value.is_empty() {
            return Err(Error::CustomError("value cannot be empty".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDeleteName {
    pub name: String,
    pub owner: String,
}

impl MsgDeleteName {
    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        prefixes.validate_account_address(&self.owner)?;
        validate_name(&self.name)
    }
}

/// Everything the chain stores about a name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Whois {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub price: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResResolve {
    pub value: String,
}

async fn query<T: serde::de::DeserializeOwned>(ctx: &ClientContext, path: &str) -> Result<T> {
    let path = format!("custom/{MODULE_NAME}/{path}");
    let response = ctx.rpc().abci_query(&path, &[], ctx.prove()).await?;
    ctx.codec.unmarshal_json(&response)
}

pub async fn resolve(ctx: &ClientContext, name: &str) -> Result<QueryResResolve> {
    validate_name(name)?;
    query(ctx, &format!("{QUERY_RESOLVE}/{name}")).await
}

pub async fn whois(ctx: &ClientContext, name: &str) -> Result<Whois> {
    validate_name(name)?;
    query(ctx, &format!("{QUERY_WHOIS}/{name}")).await
}

pub async fn names(ctx: &ClientContext) -> Result<Vec<String>> {
    query(ctx, QUERY_NAMES).await
}

pub struct AppModuleBasic;

impl ModuleBasic for AppModuleBasic {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn query_command(&self) -> Option<CommandNode> {
        Some(
            CommandNode::group(MODULE_NAME, "Querying commands for the nameservice module").with_commands([
                CommandNode::leaf::<ResolveCmd>(),
                CommandNode::leaf::<WhoisCmd>(),
                CommandNode::leaf::<NamesCmd>(),
            ]),
        )
    }

    fn tx_command(&self) -> Option<CommandNode> {
        Some(
            CommandNode::group(MODULE_NAME, "Nameservice transaction subcommands").with_commands([
                CommandNode::leaf::<BuyNameCmd>(),
                CommandNode::leaf::<SetNameCmd>(),
                CommandNode::leaf::<DeleteNameCmd>(),
            ]),
        )
    }

    fn register_rest_routes(&self, rs: &mut RestServer) {
        rest::register_routes(rs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AddressConfig;
    use pretty_assertions::assert_eq;

    fn owner(prefixes: &Bech32Prefixes) -> String {
        prefixes.account_address(&[5u8; 20]).unwrap()
    }

    #[test]
    fn buy_name_needs_a_positive_bid() {
        let prefixes = AddressConfig::default().seal();
        let mut msg = MsgBuyName {
            name: "alice.id".to_owned(),
            bid: vec![Coin::new(5, "nametoken").unwrap()],
            buyer: owner(&prefixes),
        };
        assert!(msg.validate_basic(&prefixes).is_ok());

        msg.bid = vec![];
        assert!(msg.validate_basic(&prefixes).is_err());
    }

    #[test]
    fn set_name_needs_a_name_and_value() {
        let prefixes = AddressConfig::default().seal();
        let mut msg = MsgSetName {
            name: " ".to_owned(),
            value: "8.8.8.8".to_owned(),
            owner: owner(&prefixes),
        };
        assert!(msg.validate_basic(&prefixes).is_err());

        msg.name = "alice.id".to_owned();
        assert!(msg.validate_basic(&prefixes).is_ok());

        msg.value.clear();
        assert!(msg.validate_basic(&prefixes).is_err());
    }

    #[test]
    fn delete_name_checks_the_owner_prefix() {
        let prefixes = AddressConfig::default().seal();
        let mut other = AddressConfig::default();
        other.set_bech32_prefix_for_account("other", "otherpub");
        let foreign = other.seal().account_address(&[5u8; 20]).unwrap();

        let msg = MsgDeleteName {
            name: "alice.id".to_owned(),
            owner: foreign,
        };
        assert!(msg.validate_basic(&prefixes).is_err());
    }

    #[test]
    fn whois_fields_default() {
        let whois: Whois = serde_json::from_str(r#"{"value":"8.8.8.8"}"#).unwrap();
        assert_eq!(
            whois,
            Whois {
                value: "8.8.8.8".to_owned(),
                ..Whois::default()
            }
        );
    }
}
