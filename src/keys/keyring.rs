use std::{fmt, fs, path::Path};

use secp256k1::{rand::thread_rng, Secp256k1};
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    tx::{sign_secp256k1, PubKey},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    Local,
    Offline,
    Multi,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Local => write!(f, "local"),
            KeyKind::Offline => write!(f, "offline"),
            KeyKind::Multi => write!(f, "multi"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SecretKeyBytes(Vec<u8>);

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKeyBytes(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub name: String,
    pub kind: KeyKind,
    pub pub_key: PubKey,
    secret: Option<SecretKeyBytes>,
}

impl KeyInfo {
    pub fn address(&self) -> Result<Vec<u8>> {
        self.pub_key.address()
    }

    pub fn sign(&self, sign_bytes: &[u8]) -> Result<Vec<u8>> {
        match &self.secret {
            Some(secret) => sign_secp256k1(&secret.0, sign_bytes),
            None => Err(Error::CustomError(format!(
                "key {} is a {} key and cannot sign",
                self.name, self.kind
            ))),
        }
    }
}

/// Key store under `<home>/keys`. Secrets are stored unencrypted.
#[derive(Clone)]
pub struct Keyring {
    database: sled::Db,
}

impl Keyring {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let database = sled::Config::default().path(dir).open()?;
        Ok(Self { database })
    }

    fn store(&self, info: KeyInfo) -> Result<KeyInfo> {
        if self.database.contains_key(info.name.as_bytes())? {
            return Err(Error::KeyExists(info.name));
        }
        let encoded = bincode::serialize(&info)?;
        self.database.insert(info.name.as_bytes(), encoded)?;
        self.database.flush()?;
        debug!(name = %info.name, kind = %info.kind, "stored key");
        Ok(info)
    }

    /// Generates a fresh secp256k1 key.
    pub fn create_local(&self, name: &str) -> Result<KeyInfo> {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(&mut thread_rng());
        self.store(KeyInfo {
            name: name.to_owned(),
            kind: KeyKind::Local,
            pub_key: PubKey::Secp256k1(public.serialize().to_vec()),
            secret: Some(SecretKeyBytes(secret.secret_bytes().to_vec())),
        })
    }

    /// Stores a public key only, e.g. a multisig member held elsewhere.
    pub fn create_offline(&self, name: &str, pub_key: PubKey) -> Result<KeyInfo> {
        self.store(KeyInfo {
            name: name.to_owned(),
            kind: KeyKind::Offline,
            pub_key,
            secret: None,
        })
    }

    pub fn create_multi(&self, name: &str, pub_key: PubKey) -> Result<KeyInfo> {
        if !matches!(pub_key, PubKey::Multisig(_)) {
            return Err(Error::CustomError(format!("{name}: not a multisig public key")));
        }
        self.store(KeyInfo {
            name: name.to_owned(),
            kind: KeyKind::Multi,
            pub_key,
            secret: None,
        })
    }

    pub fn get(&self, name: &str) -> Result<KeyInfo> {
        match self.database.get(name.as_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Err(Error::KeyNotFound(name.to_owned())),
        }
    }

    pub fn get_by_address(&self, address: &[u8]) -> Result<KeyInfo> {
        for info in self.list()? {
            if info.address()? == address {
                return Ok(info);
            }
        }
        Err(Error::KeyNotFound(hex::encode(address)))
    }

    /// All keys sorted by name.
    pub fn list(&self) -> Result<Vec<KeyInfo>> {
        self.database
            .iter()
            .values()
            .map(|bytes| -> Result<KeyInfo> { Ok(bincode::deserialize(&bytes?)?) })
            .collect()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        if self.database.remove(name.as_bytes())?.is_none() {
            return Err(Error::KeyNotFound(name.to_owned()));
        }
        self.database.flush()?;
        debug!(name, "deleted key");
        Ok(())
    }
}
