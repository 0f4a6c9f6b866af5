use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use serde_derive::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    codec::{base64_vec, Codec},
    Error, Result,
};

use super::{Msg, PubKey, StdFee, StdSignDoc};

/// Canonical bytes a signer commits to: compact JSON with every object's keys sorted.
pub fn sign_bytes(
    chain_id: &str,
    account_number: u64,
    sequence: u64,
    fee: &StdFee,
    msgs: &[Msg],
    memo: &str,
) -> Result<Vec<u8>> {
    let doc = StdSignDoc {
        account_number: account_number.to_string(),
        chain_id: chain_id.to_owned(),
        fee: fee.clone(),
        memo: memo.to_owned(),
        msgs: msgs.to_vec(),
        sequence: sequence.to_string(),
    };
    // serde_json::Map is ordered by key, so the round trip through Value sorts nested
    // messages as well.
    let sorted = serde_json::to_value(&doc)?;
    Codec::new().marshal_json(&sorted)
}

fn message(sign_bytes: &[u8]) -> Result<Message> {
    let digest = Sha256::digest(sign_bytes);
    Ok(Message::from_digest_slice(&digest)?)
}

/// Compact 64-byte ECDSA signature over SHA-256 of `sign_bytes`.
pub fn sign_secp256k1(secret: &[u8], sign_bytes: &[u8]) -> Result<Vec<u8>> {
    let secp = Secp256k1::signing_only();
    let secret = SecretKey::from_slice(secret)?;
    let signature = secp.sign_ecdsa(&message(sign_bytes)?, &secret);
    Ok(signature.serialize_compact().to_vec())
}

pub fn verify_secp256k1(pub_key: &[u8], sign_bytes: &[u8], signature: &[u8]) -> Result<bool> {
    let secp = Secp256k1::verification_only();
    let pub_key = PublicKey::from_slice(pub_key)?;
    let signature = Signature::from_compact(signature)?;
    Ok(secp
        .verify_ecdsa(&message(sign_bytes)?, &signature, &pub_key)
        .is_ok())
}

/// Signatures of a threshold multisig, one bit per member key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignature {
    pub bits: Vec<bool>,
    #[serde(with = "base64_vec")]
    pub sigs: Vec<Vec<u8>>,
}

impl MultiSignature {
    pub fn new(members: usize) -> Self {
        Self {
            bits: vec![false; members],
            sigs: vec![],
        }
    }

    /// Places `signature` at the slot of `pub_key` within `members`, keeping `sigs` in
    /// member order. Signing twice with the same key replaces the earlier signature.
    pub fn add_signature(&mut self, signature: Vec<u8>, pub_key: &PubKey, members: &[PubKey]) -> Result<()> {
        let index = members
            .iter()
            .position(|member| member == pub_key)
            .ok_or_else(|| Error::CustomError("signer is not a member of the multisig key".to_owned()))?;

        let slot = self.bits[..index].iter().filter(|bit| **bit).count();
        if self.bits[index] {
            self.sigs[slot] = signature;
        } else {
            self.bits[index] = true;
            self.sigs.insert(slot, signature);
        }
        Ok(())
    }

    pub fn signed_count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }
}
