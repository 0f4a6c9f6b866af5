use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use clap::Args;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::{
    cli::{flags::AccountFlags, Runnable},
    client::ClientContext,
    config::BroadcastMode,
    Error, Result,
};

use super::{
    account_numbers, broadcast, sign_bytes, sign_std_tx, verify_secp256k1, MultiSignature, PubKey,
    StdSignature, StdTx,
};

/// Reads a JSON document from `path`, or from stdin when `path` is `-`.
fn read_json_file<T: DeserializeOwned>(ctx: &ClientContext, path: &Path) -> Result<T> {
    let bytes = if path == Path::new("-") {
        let mut buf = vec![];
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(path)?
    };
    ctx.codec.unmarshal_json(&bytes)
}

fn write_document<T: Serialize>(ctx: &ClientContext, path: Option<&Path>, value: &T) -> Result<()> {
    match path {
        Some(path) => {
            let bytes = ctx.codec.marshal_json_indent(value)?;
            fs::write(path, bytes)?;
            Ok(())
        }
        None => ctx.print_json(value),
    }
}

#[derive(Debug, serde_derive::Serialize)]
#[serde(untagged)]
enum SignOutput {
    Tx(StdTx),
    Signature(StdSignature),
}

#[derive(Debug, Args)]
pub struct SignCmd {
    #[arg(help = "JSON file with the unsigned transaction, or - for stdin")]
    file: PathBuf,

    #[arg(long, help = "Name of private key with which to sign")]
    from: String,

    #[arg(long, help = "Print only the generated signature, then exit")]
    signature_only: bool,

    #[arg(
        long,
        help = "Address of the multisig account on behalf of which the transaction shall be signed"
    )]
    multisig: Option<String>,

    #[arg(long, help = "The document will be written to the given file instead of STDOUT")]
    output_document: Option<PathBuf>,

    #[command(flatten)]
    account: AccountFlags,
}

impl SignCmd {
    async fn sign(&self, ctx: &ClientContext) -> Result<SignOutput> {
        let mut tx: StdTx = read_json_file(ctx, &self.file)?;
        let key = ctx.keyring()?.get(&self.from)?;

        let signer = match &self.multisig {
            Some(multisig) => {
                ctx.prefixes.validate_account_address(multisig)?;
                multisig.clone()
            }
            None => key.pub_key.account_address(&ctx.prefixes)?,
        };
        if !tx.signers().contains(&signer.as_str()) {
            return Err(Error::CustomError(format!(
                "{signer} is not a signer of this transaction"
            )));
        }

        let (account_number, sequence) = account_numbers(ctx, &self.account, &signer).await?;
        let signature = sign_std_tx(ctx, &key, &tx, account_number, sequence)?;

        if self.multisig.is_some() || self.signature_only {
            return Ok(SignOutput::Signature(signature));
        }
        tx.signatures.push(signature);
        Ok(SignOutput::Tx(tx))
    }
}

impl Runnable for SignCmd {
    const NAME: &'static str = "sign";
    const ABOUT: &'static str = "Sign transactions generated offline";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let output = self.sign(ctx).await?;
        write_document(ctx, self.output_document.as_deref(), &output)
    }
}

#[derive(Debug, Args)]
pub struct MultiSignCmd {
    #[arg(help = "JSON file with the unsigned transaction")]
    file: PathBuf,

    #[arg(help = "Name of the multisig key in the local keyring")]
    name: String,

    #[arg(required = true, help = "Signature files produced by `tx sign --multisig`")]
    signatures: Vec<PathBuf>,

    #[arg(long, help = "The document will be written to the given file instead of STDOUT")]
    output_document: Option<PathBuf>,

    #[command(flatten)]
    account: AccountFlags,
}

impl MultiSignCmd {
    async fn combine(&self, ctx: &ClientContext) -> Result<StdTx> {
        let mut tx: StdTx = read_json_file(ctx, &self.file)?;
        let multi = ctx.keyring()?.get(&self.name)?;
        let PubKey::Multisig(multisig_key) = &multi.pub_key else {
            return Err(Error::CustomError(format!("{} is not a multisig key", self.name)));
        };

        let address = multi.pub_key.account_address(&ctx.prefixes)?;
        let (account_number, sequence) = account_numbers(ctx, &self.account, &address).await?;
        let chain_id = ctx.settings.require_chain_id()?;
        let bytes = sign_bytes(chain_id, account_number, sequence, &tx.fee, &tx.msg, &tx.memo)?;

        let mut multisig = MultiSignature::new(multisig_key.pubkeys.len());
        for path in &self.signatures {
            let signature: StdSignature = read_json_file(ctx, path)?;
            let PubKey::Secp256k1(public) = &signature.pub_key else {
                return Err(Error::CustomError(format!(
                    "{}: nested multisig signatures are not supported",
                    path.display()
                )));
            };
            if !verify_secp256k1(public, &bytes, &signature.signature)? {
                return Err(Error::CustomError(format!(
                    "couldn't verify signature from {}",
                    path.display()
                )));
            }
            multisig.add_signature(signature.signature, &signature.pub_key, &multisig_key.pubkeys)?;
        }

        if multisig.signed_count() < multisig_key.threshold as usize {
            warn!(
                signed = multisig.signed_count(),
                threshold = multisig_key.threshold,
                "multisig signature is below threshold"
            );
        }

        tx.signatures.push(StdSignature {
            pub_key: multi.pub_key.clone(),
            signature: ctx.codec.marshal_binary(&multisig)?,
        });
        Ok(tx)
    }
}

impl Runnable for MultiSignCmd {
    const NAME: &'static str = "multisign";
    const ABOUT: &'static str = "Generate multisig signatures for transactions generated offline";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx = self.combine(ctx).await?;
        write_document(ctx, self.output_document.as_deref(), &tx)
    }
}

#[derive(Debug, Args)]
pub struct BroadcastCmd {
    #[arg(help = "JSON file with the signed transaction, or - for stdin")]
    file: PathBuf,

    #[arg(long, value_enum, help = "Transaction broadcasting mode (sync|async|block)")]
    broadcast_mode: Option<BroadcastMode>,
}

impl Runnable for BroadcastCmd {
    const NAME: &'static str = "broadcast";
    const ABOUT: &'static str = "Broadcast transactions generated offline";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let tx: StdTx = read_json_file(ctx, &self.file)?;
        let mode = self.broadcast_mode.unwrap_or(ctx.settings.broadcast_mode);
        let result = broadcast(ctx, &tx, mode).await?;
        ctx.print_output(&result)
    }
}

#[derive(Debug, Args)]
pub struct EncodeCmd {
    #[arg(help = "JSON file with the transaction, or - for stdin")]
    file: PathBuf,
}

impl EncodeCmd {
    fn encode(&self, ctx: &ClientContext) -> Result<String> {
        let tx: StdTx = read_json_file(ctx, &self.file)?;
        let bytes = ctx.codec.marshal_binary(&tx)?;
        Ok(ctx.settings.encoding.encode(&bytes))
    }
}

impl Runnable for EncodeCmd {
    const NAME: &'static str = "encode";
    const ABOUT: &'static str = "Encode transactions generated offline";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        println!("{}", self.encode(ctx)?);
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DecodeCmd {
    #[arg(help = "Encoded transaction bytes, in the --encoding format")]
    data: String,
}

impl DecodeCmd {
    fn decode(&self, ctx: &ClientContext) -> Result<StdTx> {
        let bytes = ctx.settings.encoding.decode(&self.data)?;
        ctx.codec.unmarshal_binary(&bytes)
    }
}

impl Runnable for DecodeCmd {
    const NAME: &'static str = "decode";
    const ABOUT: &'static str = "Decode a binary encoded transaction string";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        ctx.print_output(&self.decode(ctx)?)
    }
}
