use std::io::{self, BufRead, Write};

use clap::{Args, ValueEnum};
use serde_derive::Serialize;

use crate::{
    cli::{CommandNode, Runnable},
    client::ClientContext,
    config::{address, AddressKind},
    tx::PubKey,
    Error, Result,
};

use super::{KeyInfo, Keyring};

pub fn keys_command() -> CommandNode {
    CommandNode::group("keys", "Add or view local private keys").with_commands([
        CommandNode::leaf::<AddCmd>(),
        CommandNode::leaf::<ListCmd>(),
        CommandNode::leaf::<ShowCmd>(),
        CommandNode::leaf::<DeleteCmd>(),
        CommandNode::leaf::<ParseCmd>(),
    ])
}

#[derive(Debug, Serialize)]
struct KeyOutput {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    address: String,
    pubkey: String,
}

fn bech32_pubkey(ctx: &ClientContext, pub_key: &PubKey, kind: AddressKind) -> Result<String> {
    let bytes = ctx.codec.marshal_binary(pub_key)?;
    ctx.prefixes.encode_pubkey(kind, &bytes)
}

fn key_output(ctx: &ClientContext, info: &KeyInfo, kind: AddressKind) -> Result<KeyOutput> {
    Ok(KeyOutput {
        name: info.name.clone(),
        kind: info.kind.to_string(),
        address: ctx.prefixes.encode_address(kind, &info.address()?)?,
        pubkey: bech32_pubkey(ctx, &info.pub_key, kind)?,
    })
}

/// Multisig members are sorted by address unless `nosort` is set, so the same
/// set of keys always yields the same multisig address.
fn multisig_pub_key(keyring: &Keyring, names: &[String], threshold: u32, nosort: bool) -> Result<PubKey> {
    let mut members = names
        .iter()
        .map(|name| {
            let info = keyring.get(name)?;
            Ok((info.address()?, info.pub_key))
        })
        .collect::<Result<Vec<_>>>()?;
    if !nosort {
        members.sort_by(|a, b| a.0.cmp(&b.0));
    }
    PubKey::multisig(threshold, members.into_iter().map(|(_, key)| key).collect())
}

#[derive(Debug, Args)]
pub struct AddCmd {
    name: String,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Construct and store a multisig public key (implies --pubkey)"
    )]
    multisig: Vec<String>,

    #[arg(
        long,
        default_value_t = 1,
        help = "K out of N required signatures. For use in conjunction with --multisig"
    )]
    multisig_threshold: u32,

    #[arg(long, help = "Keys passed to --multisig are taken in the order they're supplied")]
    nosort: bool,

    #[arg(long, help = "Parse a public key in bech32 format and save it to disk")]
    pubkey: Option<String>,
}

impl Runnable for AddCmd {
    const NAME: &'static str = "add";
    const ABOUT: &'static str = "Generate a new private key, or store a public key reference, and save it to disk";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let keyring = ctx.keyring()?;

        let info = if !self.multisig.is_empty() {
            let pub_key = multisig_pub_key(&keyring, &self.multisig, self.multisig_threshold, self.nosort)?;
            keyring.create_multi(&self.name, pub_key)?
        } else if let Some(pubkey) = &self.pubkey {
            let (prefix, bytes) = address::decode(pubkey)?;
            let expected = ctx.prefixes.pubkey_prefix(AddressKind::Account);
            if prefix != expected {
                return Err(Error::Bech32 {
                    address: pubkey.clone(),
                    reason: format!("expected prefix {expected}, got {prefix}"),
                });
            }
            keyring.create_offline(&self.name, ctx.codec.unmarshal_binary(&bytes)?)?
        } else {
            keyring.create_local(&self.name)?
        };

        ctx.print_output(&key_output(ctx, &info, AddressKind::Account)?)
    }
}

#[derive(Debug, Args)]
pub struct ListCmd {}

impl Runnable for ListCmd {
    const NAME: &'static str = "list";
    const ABOUT: &'static str = "List all keys";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let keys = ctx
            .keyring()?
            .list()?
            .iter()
            .map(|info| key_output(ctx, info, AddressKind::Account))
            .collect::<Result<Vec<_>>>()?;
        ctx.print_output(&keys)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Bech {
    #[default]
    Acc,
    Val,
    Cons,
}

impl From<Bech> for AddressKind {
    fn from(bech: Bech) -> Self {
        match bech {
            Bech::Acc => AddressKind::Account,
            Bech::Val => AddressKind::Validator,
            Bech::Cons => AddressKind::Consensus,
        }
    }
}

#[derive(Debug, Args)]
pub struct ShowCmd {
    name: String,

    #[arg(short = 'a', long, help = "Output the address only (overrides --output)")]
    address: bool,

    #[arg(short = 'p', long, help = "Output the public key only (overrides --output)")]
    pubkey: bool,

    #[arg(long, value_enum, default_value_t = Bech::Acc, help = "The Bech32 prefix encoding for a key (acc|val|cons)")]
    bech: Bech,
}

impl Runnable for ShowCmd {
    const NAME: &'static str = "show";
    const ABOUT: &'static str = "Show key info for the given name";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        if self.address && self.pubkey {
            return Err(Error::CustomError(
                "--address and --pubkey can not be used together".to_owned(),
            ));
        }

        let info = ctx.keyring()?.get(&self.name)?;
        let output = key_output(ctx, &info, self.bech.into())?;
        if self.address {
            println!("{}", output.address);
        } else if self.pubkey {
            println!("{}", output.pubkey);
        } else {
            ctx.print_output(&output)?;
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DeleteCmd {
    name: String,

    #[arg(short = 'y', long, help = "Skip confirmation prompt when deleting offline or ledger key references")]
    yes: bool,
}

impl Runnable for DeleteCmd {
    const NAME: &'static str = "delete";
    const ABOUT: &'static str = "Delete the given key";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        let keyring = ctx.keyring()?;
        keyring.get(&self.name)?;

        if !self.yes && !confirm("Key reference will be deleted. Continue? [y/N]: ")? {
            eprintln!("Aborted.");
            return Ok(());
        }

        keyring.delete(&self.name)?;
        eprintln!("Key deleted forever (uh oh!)");
        Ok(())
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[derive(Debug, Serialize)]
struct ParsedAddress {
    human: String,
    bytes: String,
}

#[derive(Debug, Serialize)]
struct AddressForms {
    formats: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ParseCmd {
    #[arg(help = "A hex string or a bech32 address")]
    address: String,
}

impl Runnable for ParseCmd {
    const NAME: &'static str = "parse";
    const ABOUT: &'static str = "Parse address from hex to bech32 and vice versa";

    async fn run(self, ctx: &ClientContext) -> Result<()> {
        match hex::decode(&self.address) {
            Ok(bytes) => ctx.print_output(&hex_to_bech32(ctx, &bytes)?),
            Err(_) => {
                let (human, bytes) = address::decode(&self.address)?;
                ctx.print_output(&ParsedAddress {
                    human,
                    bytes: hex::encode_upper(bytes),
                })
            }
        }
    }
}

fn hex_to_bech32(ctx: &ClientContext, bytes: &[u8]) -> Result<AddressForms> {
    let kinds = [AddressKind::Account, AddressKind::Validator, AddressKind::Consensus];
    let mut formats = Vec::with_capacity(kinds.len() * 2);
    for kind in kinds {
        formats.push(ctx.prefixes.encode_address(kind, bytes)?);
    }
    for kind in kinds {
        formats.push(ctx.prefixes.encode_pubkey(kind, bytes)?);
    }
    Ok(AddressForms { formats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::tests::context, keys::KeyKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn add(name: &str) -> AddCmd {
        AddCmd {
            name: name.to_owned(),
            multisig: vec![],
            multisig_threshold: 1,
            nosort: false,
            pubkey: None,
        }
    }

    #[tokio::test]
    async fn add_creates_local_keys() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());

        add("alice").run(&ctx).await.unwrap();
        let info = ctx.keyring().unwrap().get("alice").unwrap();
        assert_eq!(info.kind, KeyKind::Local);
        assert!(add("alice").run(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn multisig_members_are_sorted_by_address() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let keyring = ctx.keyring().unwrap();
        keyring.create_local("a").unwrap();
        keyring.create_local("b").unwrap();

        let forward = multisig_pub_key(&keyring, &["a".to_owned(), "b".to_owned()], 2, false).unwrap();
        let backward = multisig_pub_key(&keyring, &["b".to_owned(), "a".to_owned()], 2, false).unwrap();
        assert_eq!(forward, backward);

        let unsorted = multisig_pub_key(&keyring, &["b".to_owned(), "a".to_owned()], 2, true).unwrap();
        let PubKey::Multisig(unsorted) = unsorted else {
            panic!("expected a multisig key");
        };
        assert_eq!(unsorted.pubkeys[0], keyring.get("b").unwrap().pub_key);

        let mut cmd = add("multi");
        cmd.multisig = vec!["a".to_owned(), "b".to_owned()];
        cmd.multisig_threshold = 2;
        cmd.run(&ctx).await.unwrap();
        assert_eq!(keyring.get("multi").unwrap().pub_key, forward);
    }

    #[tokio::test]
    async fn offline_keys_round_trip_through_bech32() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let keyring = ctx.keyring().unwrap();
        let local = keyring.create_local("alice").unwrap();
        let pubkey = bech32_pubkey(&ctx, &local.pub_key, AddressKind::Account).unwrap();
        assert!(pubkey.starts_with("cosmospub1"));

        let mut cmd = add("watch");
        cmd.pubkey = Some(pubkey);
        cmd.run(&ctx).await.unwrap();

        let offline = keyring.get("watch").unwrap();
        assert_eq!(offline.kind, KeyKind::Offline);
        assert_eq!(offline.pub_key, local.pub_key);
    }

    #[tokio::test]
    async fn delete_with_yes_skips_the_prompt() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        add("alice").run(&ctx).await.unwrap();

        DeleteCmd {
            name: "alice".to_owned(),
            yes: true,
        }
        .run(&ctx)
        .await
        .unwrap();
        assert!(ctx.keyring().unwrap().list().unwrap().is_empty());
    }

    #[test]
    fn hex_addresses_expand_to_every_prefix() {
        let home = TempDir::new().unwrap();
        let ctx = context(home.path());
        let forms = hex_to_bech32(&ctx, &[7u8; 20]).unwrap();

        let prefixes: Vec<_> = forms
            .formats
            .iter()
            .map(|form| address::decode(form).unwrap().0)
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "cosmos",
                "cosmosvaloper",
                "cosmosvalcons",
                "cosmospub",
                "cosmosvaloperpub",
                "cosmosvalconspub"
            ]
        );
    }
}
