#![allow(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod keys;
pub mod modules;
pub mod rest;
pub mod tx;
pub mod types;

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("home directory flag is missing or empty")]
    MissingHome,
    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for {key}: {reason}")]
    ConfigValue { key: String, reason: String },
    #[error("flag {0} is not defined on this command")]
    FlagBinding(String),
    #[error(transparent)]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Toml encode error: {source}")]
    TomlSerError {
        #[from]
        source: toml::ser::Error,
    },
    #[error("Sled error: {source}")]
    SledError {
        #[from]
        source: sled::Error,
    },
    #[error("Bincode error: {source}")]
    BincodeError {
        #[from]
        source: bincode::Error,
    },
    #[error("Json error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("Yaml error: {source}")]
    YamlError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Hex error: {source}")]
    HexError {
        #[from]
        source: hex::FromHexError,
    },
    #[error("Base64 error: {source}")]
    Base64Error {
        #[from]
        source: base64::DecodeError,
    },
    #[error("Base58 error: {source}")]
    Base58Error {
        #[from]
        source: bs58::decode::Error,
    },
    #[error("Secp256k1 error: {source}")]
    Secp256k1Error {
        #[from]
        source: secp256k1::Error,
    },
    #[error("Http error: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },
    #[error("Io error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("invalid bech32 address {address}: {reason}")]
    Bech32 { address: String, reason: String },
    #[error("rpc error {code}: {message} {data}")]
    Rpc {
        code: i64,
        message: String,
        data: String,
    },
    #[error("query {path} failed with code {code}: {log}")]
    AbciQuery { path: String, code: u32, log: String },
    #[error("key {0} not found")]
    KeyNotFound(String),
    #[error("key {0} already exists")]
    KeyExists(String),
    #[error("invalid coins: {0}")]
    InvalidCoins(String),
    #[error("{0}")]
    CustomError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_underlying_cause() {
        let source = bincode::deserialize::<String>(&[0]).unwrap_err();
        let cause = source.to_string();
        let message = Error::from(source).to_string();
        assert!(message.starts_with("Bincode error: "), "{message}");
        assert!(message.ends_with(&cause), "{message}");

        let source = sled::Error::Unsupported("read only".to_owned());
        let cause = source.to_string();
        assert_eq!(Error::from(source).to_string(), format!("Sled error: {cause}"));
    }
}
