use std::{fs, path::Path};

use clap_complete::Shell;
use nscli::{app, cli, Error};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

async fn run(home: &Path, args: &[&str]) -> nscli::Result<()> {
    let home = home.display().to_string();
    let mut argv = vec!["nscli"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&["--home", &home]);
    cli::execute(argv).await
}

fn write_config(home: &Path, content: &str) {
    let dir = home.join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[tokio::test]
async fn completion_prints_a_script() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["completion"]).await.unwrap();
    run(home.path(), &["completion", "--shell", "zsh"]).await.unwrap();

    let modules = app::module_basics();
    for shell in [Shell::Bash, Shell::Zsh] {
        let mut script = Vec::new();
        cli::write_completion(shell, &modules, &mut script);
        let script = String::from_utf8(script).unwrap();
        assert!(!script.is_empty());
        assert!(script.contains("nscli"), "{shell}: {script}");
    }
}

#[tokio::test]
async fn malformed_config_stops_before_the_command_runs() {
    let home = TempDir::new().unwrap();
    write_config(home.path(), "chain-id = [");

    let result = run(home.path(), &["keys", "add", "alice"]).await;
    assert!(matches!(result, Err(Error::ConfigParse { .. })), "{result:?}");
    assert!(!home.path().join("keys").exists());
}

#[tokio::test]
async fn wrongly_typed_config_values_are_rejected() {
    let home = TempDir::new().unwrap();
    write_config(home.path(), "output = 5");

    let result = run(home.path(), &["version"]).await;
    assert!(matches!(result, Err(Error::ConfigValue { ref key, .. }) if key == "output"), "{result:?}");
}

#[tokio::test]
async fn config_command_round_trips_through_the_file() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["config", "chain-id", "namechain"]).await.unwrap();
    run(home.path(), &["config", "trust-node", "true"]).await.unwrap();

    let content = fs::read_to_string(home.path().join("config").join("config.toml")).unwrap();
    let table: toml::Table = content.parse().unwrap();
    assert_eq!(table["chain-id"].as_str(), Some("namechain"));
    assert_eq!(table["trust-node"].as_bool(), Some(true));

    assert!(run(home.path(), &["config", "colour", "blue"]).await.is_err());
}

#[tokio::test]
async fn keys_can_be_added_listed_and_deleted() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["keys", "add", "alice", "-o", "json"]).await.unwrap();
    run(home.path(), &["keys", "list"]).await.unwrap();
    run(home.path(), &["keys", "show", "alice", "--address"]).await.unwrap();
    run(home.path(), &["keys", "delete", "alice", "-y"]).await.unwrap();

    let result = run(home.path(), &["keys", "show", "alice"]).await;
    assert!(matches!(result, Err(Error::KeyNotFound(_))), "{result:?}");
}

#[tokio::test]
async fn generate_only_send_needs_no_node() {
    let home = TempDir::new().unwrap();
    let prefixes = app::sealed_address_config();
    let from = prefixes.account_address(&[1u8; 20]).unwrap();
    let to = prefixes.account_address(&[2u8; 20]).unwrap();

    run(
        home.path(),
        &["tx", "send", &from, &to, "10stake", "--generate-only", "--chain-id", "namechain"],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn filtered_module_groups_are_not_reachable() {
    let home = TempDir::new().unwrap();
    for group in ["auth", "bank"] {
        let result = run(home.path(), &["tx", group, "--help"]).await;
        let Err(Error::Clap { source }) = result else {
            panic!("tx {group} should not parse: {result:?}");
        };
        assert_eq!(source.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }
}

#[tokio::test]
async fn help_is_reported_as_a_clap_error() {
    let home = TempDir::new().unwrap();
    let result = run(home.path(), &["query", "--help"]).await;
    let Err(Error::Clap { source }) = result else {
        panic!("expected help output: {result:?}");
    };
    assert_eq!(source.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn command_tree_is_stable_between_constructions() {
    let modules = app::module_basics();
    let first = cli::root_command(&modules);
    let second = cli::root_command(&modules);

    for name in first.child_names() {
        let (a, b) = (first.child(name).unwrap(), second.child(name).unwrap());
        assert_eq!(a.child_names(), b.child_names());
        assert_eq!(a.aliases(), b.aliases());
    }
}
