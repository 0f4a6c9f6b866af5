//! Static description of the nameservice application as seen by its client.

use std::path::PathBuf;

use directories::BaseDirs;

use crate::{
    codec::Codec,
    config::{AddressConfig, Bech32Prefixes},
    modules::{auth, bank, nameservice, ModuleBasics},
};

pub const APP_NAME: &str = "nscli";
pub const APP_ABOUT: &str = "nameservice Client";
pub const SERVER_NAME: &str = "nsd";

pub fn default_cli_home() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".nscli"))
        .unwrap_or_else(|| PathBuf::from(".nscli"))
}

pub fn make_codec() -> Codec {
    Codec::new()
}

/// The application's modules in registration order.
pub fn module_basics() -> ModuleBasics {
    ModuleBasics::new(vec![
        Box::new(auth::AppModuleBasic),
        Box::new(bank::AppModuleBasic),
        Box::new(nameservice::AppModuleBasic),
    ])
}

/// Address prefixes for accounts, validators and consensus nodes, sealed.
pub fn sealed_address_config() -> Bech32Prefixes {
    AddressConfig::default().seal()
}
