// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    network::{ChainId, Network},
    primitives::Address,
    provider::MIN_POLL_INTERVAL,
    schema::{ContractDescriptor, REGISTER_CONTRACT_ADDRESS},
};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "register-dapp.toml";
/// Environment variable overriding the endpoint URL.
pub const RPC_URL_ENV: &str = "REGISTER_DAPP_RPC_URL";

/// Default wallet endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Default location of the compiled register contract.
pub const DEFAULT_ARTIFACT: &str = "artifacts/contracts/Register.sol/Register.json";

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_chain_id() -> ChainId {
    Network::goerli().chain_id
}

fn default_network_name() -> String {
    Network::goerli().name
}

fn default_contract_address() -> String {
    REGISTER_CONTRACT_ADDRESS.to_string()
}

fn default_artifact() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT)
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

/// Runtime settings. Every key is optional and defaults to the values the
/// dapp was built for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Wallet JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Accepted chain id.
    #[serde(default = "default_chain_id")]
    pub chain_id: ChainId,
    /// Name of the accepted network, shown in alerts.
    #[serde(default = "default_network_name")]
    pub network_name: String,
    /// Address of the deployed register contract.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    /// Compiled contract artifact used by the deployer.
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,
    /// Receipt polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound for a join or deployment to confirm, in seconds.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            network_name: default_network_name(),
            contract_address: default_contract_address(),
            artifact: default_artifact(),
            poll_interval_ms: default_poll_interval_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    /// [`Error::Toml`] for malformed documents or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path`, then applies environment overrides.
    ///
    /// # Errors
    /// [`Error::Config`] naming `path` if it cannot be read, otherwise as
    /// [`Self::from_toml`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let mut config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Loads [`CONFIG_FILE`] from `dir` if present, defaults otherwise.
    ///
    /// # Errors
    /// As [`Self::load`] when the file exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            return Self::load(&path);
        }
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var(RPC_URL_ENV) {
            if !url.is_empty() {
                self.rpc_url = url;
            }
        }
    }

    /// The accepted network.
    #[must_use]
    pub fn network(&self) -> Network {
        Network {
            name: self.network_name.clone(),
            chain_id: self.chain_id,
        }
    }

    /// The register contract this configuration points at.
    ///
    /// # Errors
    /// [`Error::InvalidAddress`] if `contract-address` does not parse.
    pub fn descriptor(&self) -> Result<ContractDescriptor> {
        let address: Address = self
            .contract_address
            .parse()
            .map_err(|_| Error::InvalidAddress(self.contract_address.clone()))?;
        Ok(ContractDescriptor::register(address))
    }

    /// Receipt polling interval, no shorter than [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }

    /// Bound on a join or deployment waiting for confirmation.
    #[must_use]
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").expect("valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.network(), Network::goerli());
        assert_eq!(config.artifact, PathBuf::from(DEFAULT_ARTIFACT));
    }

    #[test]
    fn keys_are_kebab_case() {
        let config = Config::from_toml(
            r#"
            rpc-url = "http://localhost:9999"
            chain-id = 31337
            network-name = "hardhat"
            confirmation-timeout-secs = 5
            "#,
        )
        .expect("valid");

        assert_eq!(config.rpc_url, "http://localhost:9999");
        assert_eq!(config.network().chain_id, 31337);
        assert_eq!(config.network().mismatch_alert(), "You are not on the hardhat network");
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("capacity = 10").expect_err("not configurable");
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn bad_contract_address_is_reported() {
        let config = Config {
            contract_address: "0x1234".to_string(),
            ..Config::default()
        };
        let err = config.descriptor().expect_err("invalid");
        assert!(err.to_string().contains("0x1234"));
    }

    #[test]
    fn discover_reads_file_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), "poll-interval-ms = 250\n").expect("write");

        let config = Config::discover(dir.path()).expect("loads");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_poll_interval_is_raised_to_the_floor() {
        let config = Config::from_toml("poll-interval-ms = 0").expect("valid");
        assert_eq!(config.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        let err = Config::load(&path).expect_err("missing");
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
