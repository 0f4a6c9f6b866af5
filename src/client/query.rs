use base64::{engine::general_purpose::STANDARD, Engine};
use clap::Args;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::{cli::Runnable, config::AddressKind, Result};

use super::ClientContext;

#[derive(Debug, Deserialize)]
struct RpcValidators {
    block_height: String,
    validators: Vec<RpcValidator>,
}

#[derive(Debug, Deserialize)]
struct RpcValidator {
    address: String,
    pub_key: RpcPubKey,
    voting_power: String,
    #[serde(default)]
    proposer_priority: String,
}

#[derive(Debug, Deserialize)]
struct RpcPubKey {
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorOutput {
    pub address: String,
    pub pub_key: String,
    pub proposer_priority: String,
    pub voting_power: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorSetOutput {
    pub block_height: String,
    pub validators: Vec<ValidatorOutput>,
}

/// Validator set at `height` (latest when `None`), with addresses and keys re-encoded
/// using the consensus prefixes.
pub async fn validator_set(ctx: &ClientContext, height: Option<u64>) -> Result<ValidatorSetOutput> {
    let result = ctx.rpc().validators(height).await?;
    validator_set_from_rpc(ctx, result)
}

fn validator_set_from_rpc(ctx: &ClientContext, result: Value) -> Result<ValidatorSetOutput> {
    let rpc: RpcValidators = serde_json::from_value(result)?;
    let validators = rpc
        .validators
        .into_iter()
        .map(|validator| {
            Ok(ValidatorOutput {
                address: ctx
                    .prefixes
                    .encode_address(AddressKind::Consensus, &hex::decode(&validator.address)?)?,
                pub_key: ctx
                    .prefixes
                    .encode_pubkey(AddressKind::Consensus, &STANDARD.decode(&validator.pub_key.value)?)?,
                proposer_priority: validator.proposer_priority,
                voting_power: validator.voting_power,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ValidatorSetOutput {
        block_height: rpc.block_height,
        validators,
    })
}

#[derive(Debug, Args)]
pub struct ValidatorSetCmd {
    #[arg(help = "Block height; latest when omitted")]
    height: Option<u64>,
}

impl Runnable for ValidatorSetCmd {
    const NAME: &'static str = "tendermint-validator-set";
    const ABOUT: &'static str = "Get the full tendermint validator set at given height";
    const ALIASES: &'static [&'static str] = &["validator"];

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&validator_set(ctx, self.height).await?)
    }
}

#[derive(Debug, Args)]
pub struct BlockCmd {
    #[arg(help = "Block height; latest when omitted")]
    height: Option<u64>,
}

impl Runnable for BlockCmd {
    const NAME: &'static str = "block";
    const ABOUT: &'static str = "Get verified data for a the block at given height";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&ctx.rpc().block(self.height).await?)
    }
}
