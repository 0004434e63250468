mod common;

use std::{fs, path::Path};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use register_dapp::{
    config::CONFIG_FILE,
    deploy::REGISTER_CAPACITY,
    devnet::Devnet,
    primitives::Address,
};
use tempfile::tempdir;

fn write_artifact(dir: &Path) {
    let artifacts = dir.join("artifacts/contracts/Register.sol");
    fs::create_dir_all(&artifacts).expect("artifact dir");
    fs::write(
        artifacts.join("Register.json"),
        r#"{ "contractName": "Register", "bytecode": "0x6080604052" }"#,
    )
    .expect("artifact");
}

fn write_config(dir: &Path, register: Address) {
    fs::write(
        dir.join(CONFIG_FILE),
        format!("contract-address = \"{register}\"\npoll-interval-ms = 50\n"),
    )
    .expect("config");
}

#[test]
fn deploy_prints_checksummed_address() {
    let endpoint = common::serve(Devnet::new(5));
    let tmp = tempdir().expect("tempdir");
    write_artifact(tmp.path());

    let output = cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("deploy")
        .output()
        .expect("runs");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8");
    let shown = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Register Contract Address: "))
        .expect("address line");
    assert_eq!(shown.len(), 42);

    let address: Address = shown.parse().expect("valid address");
    assert_eq!(address.to_string(), shown);

    let state = endpoint.devnet.register_state(&address).expect("deployed");
    assert_eq!(state.capacity, REGISTER_CAPACITY);
    assert_eq!(state.count, 0);
}

#[test]
fn deploy_on_another_network_fails() {
    let endpoint = common::serve(Devnet::new(1));
    let tmp = tempdir().expect("tempdir");
    write_artifact(tmp.path());

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("deploy")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Register Contract Address").not())
        .stderr(predicate::str::contains("You are not on the goerli network"));
    assert_eq!(endpoint.devnet.block_number(), 0);
}

#[test]
fn page_offers_join_to_connected_wallet() {
    let devnet = Devnet::new(5);
    let register = devnet.install_register(5);
    let endpoint = common::serve(devnet);
    let tmp = tempdir().expect("tempdir");
    write_config(tmp.path(), register);

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("page")
        .assert()
        .success()
        .stdout(predicate::str::contains("This 0 person's registered"))
        .stdout(predicate::str::contains("[ Click here to Register! ]"));
}

#[test]
fn join_registers_the_wallet() {
    let devnet = Devnet::new(5);
    let register = devnet.install_register(5);
    let endpoint = common::serve(devnet);
    let tmp = tempdir().expect("tempdir");
    write_config(tmp.path(), register);

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("join")
        .assert()
        .success()
        .stdout(predicate::str::contains("This 1 person's registered"))
        .stdout(predicate::str::contains("You are now in the register list!"))
        .stdout(predicate::str::contains("[ Click here to Register! ]").not());

    let state = endpoint.devnet.register_state(&register).expect("deployed");
    assert!(state.members.contains(&Devnet::dev_account(0)));

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("page")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are now in the register list!"));
}

#[test]
fn join_on_full_register_keeps_the_button() {
    let devnet = Devnet::new(5);
    let register = devnet.install_register(0);
    let endpoint = common::serve(devnet);
    let tmp = tempdir().expect("tempdir");
    write_config(tmp.path(), register);

    cargo_bin_cmd!("register-dapp")
        .current_dir(tmp.path())
        .env("REGISTER_DAPP_RPC_URL", &endpoint.url)
        .arg("join")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ Click here to Register! ]"));
    assert_eq!(endpoint.devnet.block_number(), 0);
}
