use bech32::{Bech32, Hrp};

use crate::{Error, Result};

pub const BECH32_MAIN_PREFIX: &str = "cosmos";

const PREFIX_VALIDATOR: &str = "val";
const PREFIX_CONSENSUS: &str = "cons";
const PREFIX_PUBLIC: &str = "pub";
const PREFIX_OPERATOR: &str = "oper";

/// Mutable address prefix configuration. The only way out is [`AddressConfig::seal`].
#[derive(Debug, Clone)]
pub struct AddressConfig {
    account: (String, String),
    validator: (String, String),
    consensus: (String, String),
}

impl Default for AddressConfig {
    fn default() -> Self {
        let main = BECH32_MAIN_PREFIX;
        Self {
            account: (main.to_owned(), format!("{main}{PREFIX_PUBLIC}")),
            validator: (
                format!("{main}{PREFIX_VALIDATOR}{PREFIX_OPERATOR}"),
                format!("{main}{PREFIX_VALIDATOR}{PREFIX_OPERATOR}{PREFIX_PUBLIC}"),
            ),
            consensus: (
                format!("{main}{PREFIX_VALIDATOR}{PREFIX_CONSENSUS}"),
                format!("{main}{PREFIX_VALIDATOR}{PREFIX_CONSENSUS}{PREFIX_PUBLIC}"),
            ),
        }
    }
}

impl AddressConfig {
    pub fn set_bech32_prefix_for_account(&mut self, address: &str, public_key: &str) -> &mut Self {
        self.account = (address.to_owned(), public_key.to_owned());
        self
    }

    pub fn set_bech32_prefix_for_validator(&mut self, address: &str, public_key: &str) -> &mut Self {
        self.validator = (address.to_owned(), public_key.to_owned());
        self
    }

    pub fn set_bech32_prefix_for_consensus_node(
        &mut self,
        address: &str,
        public_key: &str,
    ) -> &mut Self {
        self.consensus = (address.to_owned(), public_key.to_owned());
        self
    }

    /// Freezes the prefixes. [`Bech32Prefixes`] has no setters, so nothing can change
    /// them once a command runs.
    pub fn seal(self) -> Bech32Prefixes {
        Bech32Prefixes {
            account_addr: self.account.0,
            account_pub: self.account.1,
            validator_addr: self.validator.0,
            validator_pub: self.validator.1,
            consensus_addr: self.consensus.0,
            consensus_pub: self.consensus.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Account,
    Validator,
    Consensus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Prefixes {
    account_addr: String,
    account_pub: String,
    validator_addr: String,
    validator_pub: String,
    consensus_addr: String,
    consensus_pub: String,
}

impl Bech32Prefixes {
    pub fn address_prefix(&self, kind: AddressKind) -> &str {
        match kind {
            AddressKind::Account => &self.account_addr,
            AddressKind::Validator => &self.validator_addr,
            AddressKind::Consensus => &self.consensus_addr,
        }
    }

    pub fn pubkey_prefix(&self, kind: AddressKind) -> &str {
        match kind {
            AddressKind::Account => &self.account_pub,
            AddressKind::Validator => &self.validator_pub,
            AddressKind::Consensus => &self.consensus_pub,
        }
    }

    pub fn encode_address(&self, kind: AddressKind, bytes: &[u8]) -> Result<String> {
        encode(self.address_prefix(kind), bytes)
    }

    pub fn encode_pubkey(&self, kind: AddressKind, bytes: &[u8]) -> Result<String> {
        encode(self.pubkey_prefix(kind), bytes)
    }

    pub fn account_address(&self, bytes: &[u8]) -> Result<String> {
        self.encode_address(AddressKind::Account, bytes)
    }

    /// Decodes `address` and checks that it carries the prefix for `kind`.
    pub fn decode_address(&self, kind: AddressKind, address: &str) -> Result<Vec<u8>> {
        let (prefix, bytes) = decode(address)?;
        let expected = self.address_prefix(kind);
        if prefix != expected {
            return Err(Error::Bech32 {
                address: address.to_owned(),
                reason: format!("expected prefix {expected}, got {prefix}"),
            });
        }
        if bytes.is_empty() {
            return Err(Error::Bech32 {
                address: address.to_owned(),
                reason: "empty address".to_owned(),
            });
        }
        Ok(bytes)
    }

    pub fn validate_account_address(&self, address: &str) -> Result<()> {
        self.decode_address(AddressKind::Account, address).map(|_| ())
    }
}

pub fn encode(prefix: &str, bytes: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix).map_err(|e| Error::Bech32 {
        address: prefix.to_owned(),
        reason: e.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, bytes).map_err(|e| Error::Bech32 {
        address: hex::encode(bytes),
        reason: e.to_string(),
    })
}

pub fn decode(address: &str) -> Result<(String, Vec<u8>)> {
    let (hrp, bytes) = bech32::decode(address).map_err(|e| Error::Bech32 {
        address: address.to_owned(),
        reason: e.to_string(),
    })?;
    Ok((hrp.to_string().to_lowercase(), bytes))
}
