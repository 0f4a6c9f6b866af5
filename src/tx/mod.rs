mod builder;
mod cli;
mod sign;

pub use builder::{account_numbers, broadcast, sign_std_tx, Sender, TxContext};
pub use cli::{BroadcastCmd, DecodeCmd, EncodeCmd, MultiSignCmd, SignCmd};
pub use sign::{sign_bytes, sign_secp256k1, verify_secp256k1, MultiSignature};

use ripemd::{Digest, Ripemd160};
use serde_derive::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    codec::{base64_bytes, u64_string, Codec},
    config::Bech32Prefixes,
    modules::{
        bank::MsgSend,
        nameservice::{MsgBuyName, MsgDeleteName, MsgSetName},
    },
    types::Coin,
    Error, Result,
};

pub const DEFAULT_GAS: u64 = 200_000;

const ADDRESS_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PubKey {
    #[serde(rename = "tendermint/PubKeySecp256k1")]
    Secp256k1(#[serde(with = "base64_bytes")] Vec<u8>),
    #[serde(rename = "tendermint/PubKeyMultisigThreshold")]
    Multisig(MultisigThresholdPubKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigThresholdPubKey {
    pub threshold: u32,
    pub pubkeys: Vec<PubKey>,
}

impl PubKey {
    pub fn address(&self) -> Result<Vec<u8>> {
        match self {
            PubKey::Secp256k1(bytes) => {
                let sha = Sha256::digest(bytes);
                Ok(Ripemd160::digest(sha).to_vec())
            }
            PubKey::Multisig(_) => {
                let encoded = Codec::new().marshal_binary(self)?;
                Ok(Sha256::digest(encoded)[..ADDRESS_LENGTH].to_vec())
            }
        }
    }

    pub fn account_address(&self, prefixes: &Bech32Prefixes) -> Result<String> {
        prefixes.account_address(&self.address()?)
    }

    pub fn multisig(threshold: u32, pubkeys: Vec<PubKey>) -> Result<Self> {
        if threshold == 0 || threshold as usize > pubkeys.len() {
            return Err(Error::CustomError(format!(
                "threshold must be between 1 and {}, got {threshold}",
                pubkeys.len()
            )));
        }
        Ok(PubKey::Multisig(MultisigThresholdPubKey { threshold, pubkeys }))
    }
}

/// Every message the client knows how to build or decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    #[serde(rename = "cosmos-sdk/MsgSend")]
    Send(MsgSend),
    #[serde(rename = "nameservice/BuyName")]
    BuyName(MsgBuyName),
    #[serde(rename = "nameservice/SetName")]
    SetName(MsgSetName),
    #[serde(rename = "nameservice/DeleteName")]
    DeleteName(MsgDeleteName),
}

impl Msg {
    pub fn signers(&self) -> Vec<&str> {
        match self {
            Msg::Send(msg) => vec![msg.from_address.as_str()],
            Msg::BuyName(msg) => vec![msg.buyer.as_str()],
            Msg::SetName(msg) => vec![msg.owner.as_str()],
            Msg::DeleteName(msg) => vec![msg.owner.as_str()],
        }
    }

    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        match self {
            Msg::Send(msg) => msg.validate_basic(prefixes),
            Msg::BuyName(msg) => msg.validate_basic(prefixes),
            Msg::SetName(msg) => msg.validate_basic(prefixes),
            Msg::DeleteName(msg) => msg.validate_basic(prefixes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    #[serde(with = "u64_string")]
    pub gas: u64,
}

impl Default for StdFee {
    fn default() -> Self {
        Self {
            amount: vec![],
            gas: DEFAULT_GAS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: PubKey,
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<Msg>,
    pub fee: StdFee,
    pub signatures: Vec<StdSignature>,
    pub memo: String,
}

impl StdTx {
    pub fn new(msg: Vec<Msg>, fee: StdFee, memo: String) -> Self {
        Self {
            msg,
            fee,
            signatures: vec![],
            memo,
        }
    }

    /// Unique signer addresses in message order.
    pub fn signers(&self) -> Vec<&str> {
        let mut signers: Vec<&str> = vec![];
        for signer in self.msg.iter().flat_map(Msg::signers) {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }

    pub fn validate_basic(&self, prefixes: &Bech32Prefixes) -> Result<()> {
        if self.msg.is_empty() {
            return Err(Error::CustomError("transaction has no messages".to_owned()));
        }
        self.msg
            .iter()
            .try_for_each(|msg| msg.validate_basic(prefixes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignDoc {
    pub account_number: String,
    pub chain_id: String,
    pub fee: StdFee,
    pub memo: String,
    pub msgs: Vec<Msg>,
    pub sequence: String,
}

/// Account state as returned by the auth module query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: String,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub public_key: Option<PubKey>,
    #[serde(default)]
    pub account_number: u64,
    #[serde(default)]
    pub sequence: u64,
}
