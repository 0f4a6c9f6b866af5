use serde_json::Value;
use tracing::{debug, info};

use crate::{
    cli::flags::{AccountFlags, TxFlags},
    client::ClientContext,
    config::BroadcastMode,
    keys::KeyInfo,
    modules::auth,
    types::parse_coins,
    Error, Result,
};

use super::{sign_bytes, Msg, StdFee, StdSignature, StdTx};

/// Who a transaction is built for. `key` is absent only in generate-only mode when
/// `--from` named an address instead of a local key.
#[derive(Debug, Clone)]
pub struct Sender {
    pub address: String,
    key: Option<KeyInfo>,
}

/// Builds, signs and broadcasts transactions for the commands that share [`TxFlags`].
pub struct TxContext<'a> {
    ctx: &'a ClientContext,
    flags: TxFlags,
}

impl<'a> TxContext<'a> {
    pub fn new(ctx: &'a ClientContext, flags: TxFlags) -> Self {
        Self { ctx, flags }
    }

    pub fn fee(&self) -> Result<StdFee> {
        Ok(StdFee {
            amount: parse_coins(&self.flags.fees)?,
            gas: self.flags.gas,
        })
    }

    pub fn broadcast_mode(&self) -> BroadcastMode {
        self.flags
            .broadcast_mode
            .unwrap_or(self.ctx.settings.broadcast_mode)
    }

    /// Resolves `--from`: a key name, or a bech32 address when only generating.
    pub fn sender(&self, from: &str) -> Result<Sender> {
        if self.flags.generate_only && self.ctx.prefixes.validate_account_address(from).is_ok() {
            return Ok(Sender {
                address: from.to_owned(),
                key: None,
            });
        }

        let key = self.ctx.keyring()?.get(from)?;
        Ok(Sender {
            address: key.pub_key.account_address(&self.ctx.prefixes)?,
            key: Some(key),
        })
    }

    pub fn build_unsigned(&self, msgs: Vec<Msg>) -> Result<StdTx> {
        let tx = StdTx::new(msgs, self.fee()?, self.flags.memo.clone());
        tx.validate_basic(&self.ctx.prefixes)?;
        Ok(tx)
    }

    /// Prints the unsigned transaction in generate-only mode, otherwise signs it with
    /// the sender's key and broadcasts it.
    pub async fn complete_and_broadcast(&self, sender: &Sender, msgs: Vec<Msg>) -> Result<()> {
        let mut tx = self.build_unsigned(msgs)?;

        if self.flags.generate_only {
            return self.ctx.print_json(&tx);
        }

        let key = sender
            .key
            .as_ref()
            .ok_or_else(|| Error::CustomError("--from must name a local key unless --generate-only is set".to_owned()))?;
        let (account_number, sequence) = account_numbers(self.ctx, &self.flags.account, &sender.address).await?;
        let signature = sign_std_tx(self.ctx, key, &tx, account_number, sequence)?;
        tx.signatures.push(signature);

        let result = broadcast(self.ctx, &tx, self.broadcast_mode()).await?;
        self.ctx.print_output(&result)
    }
}

/// Account number and sequence for `address`, from the flags in offline mode and
/// from the node otherwise. Explicit flags override the queried values.
pub async fn account_numbers(ctx: &ClientContext, flags: &AccountFlags, address: &str) -> Result<(u64, u64)> {
    if flags.offline {
        return match (flags.account_number, flags.sequence) {
            (Some(account_number), Some(sequence)) => Ok((account_number, sequence)),
            _ => Err(Error::CustomError(
                "--account-number and --sequence are required in offline mode".to_owned(),
            )),
        };
    }

    let account = auth::query_account(ctx, address).await?;
    debug!(address, account_number = account.account_number, sequence = account.sequence, "queried account");
    Ok((
        flags.account_number.unwrap_or(account.account_number),
        flags.sequence.unwrap_or(account.sequence),
    ))
}

pub fn sign_std_tx(
    ctx: &ClientContext,
    key: &KeyInfo,
    tx: &StdTx,
    account_number: u64,
    sequence: u64,
) -> Result<StdSignature> {
    let chain_id = ctx.settings.require_chain_id()?;
    let bytes = sign_bytes(chain_id, account_number, sequence, &tx.fee, &tx.msg, &tx.memo)?;
    Ok(StdSignature {
        pub_key: key.pub_key.clone(),
        signature: key.sign(&bytes)?,
    })
}

pub async fn broadcast(ctx: &ClientContext, tx: &StdTx, mode: BroadcastMode) -> Result<Value> {
    let bytes = ctx.codec.marshal_binary(tx)?;
    info!(?mode, size = bytes.len(), "broadcasting transaction");
    ctx.rpc().broadcast_tx(&bytes, mode).await
}
