use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

// Nothing listens on the discard port.
const UNREACHABLE_RPC: &str = "http://127.0.0.1:9";

#[test]
fn abi_lists_every_register_entry() {
    let output = cargo_bin_cmd!("register-dapp")
        .arg("abi")
        .output()
        .expect("runs");
    assert!(output.status.success());

    let abi: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let entries = abi.as_array().expect("array");
    assert_eq!(entries.len(), 5);

    let names: Vec<_> = entries
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    for name in ["joinWalletToReg", "maxWalletForReg", "numWalletInReg", "walletInReg"] {
        assert!(names.contains(&name), "{name} missing from {names:?}");
    }
}

#[test]
fn deploy_without_artifact_fails() {
    let tmp = tempdir().expect("tempdir");

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", UNREACHABLE_RPC)
        .arg("deploy")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid contract artifact"));
}

#[test]
fn deploy_with_unreachable_wallet_fails() {
    let tmp = tempdir().expect("tempdir");
    let artifacts = tmp.path().join("artifacts/contracts/Register.sol");
    fs::create_dir_all(&artifacts).expect("artifact dir");
    fs::write(
        artifacts.join("Register.json"),
        r#"{ "contractName": "Register", "bytecode": "0x6080604052" }"#,
    )
    .expect("artifact");

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", UNREACHABLE_RPC)
        .arg("deploy")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Register Contract Address").not())
        .stderr(predicate::str::contains("transport error"));
}

#[test]
fn page_without_wallet_prompts_to_connect() {
    let tmp = tempdir().expect("tempdir");

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", UNREACHABLE_RPC)
        .arg("page")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome To NFT NYC!"))
        .stdout(predicate::str::contains("This 0 person's registered"))
        .stdout(predicate::str::contains("[ Connect your wallet ]"));
}

#[test]
fn page_rejects_unknown_config_keys() {
    let tmp = tempdir().expect("tempdir");
    let config = tmp.path().join("custom.toml");
    fs::write(&config, "capacity = 10\n").expect("config");

    cargo_bin_cmd!("register-dapp")
        .args(["page", "--config", config.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML parse error"));
}

#[test]
fn completions_name_the_binary() {
    cargo_bin_cmd!("register-dapp")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("register-dapp"));
}
