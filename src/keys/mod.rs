mod cli;
mod keyring;

pub use cli::{keys_command, AddCmd, DeleteCmd, ListCmd, ParseCmd, ShowCmd};
pub use keyring::{KeyInfo, KeyKind, Keyring};
