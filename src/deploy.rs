// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Publishing the register contract.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info};
use serde::Deserialize;

use crate::{
    abi::{self, Token},
    error::{Error, Result},
    primitives::{decode_hex, Address, TxHash},
    provider::{PendingTransaction, Resolver, TransactionRequest, WalletProvider},
    schema::REGISTER,
};

/// Maximum number of wallets allowed to join a freshly deployed register.
pub const REGISTER_CAPACITY: u8 = 5;

/// Compiled contract as emitted by the build toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Contract name recorded in the artifact.
    pub contract_name: String,
    /// Creation bytecode.
    pub bytecode: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    bytecode: String,
}

impl Artifact {
    /// Reads a Hardhat-style artifact (`contractName`, `bytecode`).
    ///
    /// # Errors
    /// [`Error::Artifact`] naming `path` if it is missing, is not JSON,
    /// describes another contract or has no bytecode.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| Error::Artifact {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::Artifact {
            path: PathBuf::from(path),
            reason,
        };

        let file: ArtifactFile =
            serde_json::from_str(content).map_err(|err| invalid(err.to_string()))?;
        if file.contract_name != REGISTER.name {
            return Err(invalid(format!(
                "expected contract '{}', found '{}'",
                REGISTER.name, file.contract_name
            )));
        }

        let bytecode = decode_hex(&file.bytecode).map_err(|err| invalid(err.to_string()))?;
        if bytecode.is_empty() {
            return Err(invalid("bytecode is empty".to_string()));
        }

        Ok(Self {
            contract_name: file.contract_name,
            bytecode,
        })
    }

    /// Creation code with the ABI-encoded capacity appended.
    ///
    /// # Errors
    /// Propagates constructor encoding failures.
    pub fn init_code(&self, capacity: u8) -> Result<Vec<u8>> {
        let mut code = self.bytecode.clone();
        code.extend(abi::encode_args(
            REGISTER.constructor.inputs,
            &[Token::Uint8(capacity)],
        )?);
        Ok(code)
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the new contract.
    pub address: Address,
    /// Creation transaction.
    pub transaction_hash: TxHash,
    /// Block the creation was mined in.
    pub block_number: u64,
}

/// Deployment parameters.
#[derive(Debug, Clone, Copy)]
pub struct DeployOptions {
    /// Constructor capacity.
    pub capacity: u8,
    /// Receipt polling interval.
    pub poll_interval: Duration,
    /// Upper bound for the creation to confirm.
    pub timeout: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            capacity: REGISTER_CAPACITY,
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Deploys `artifact` from the wallet's signing account and waits for the
/// creation to be mined.
///
/// # Errors
/// Resolution and wallet failures, [`Error::Timeout`] if submission and
/// confirmation together exceed `options.timeout`, and
/// [`Error::MissingContractAddress`] for a receipt without an address.
pub async fn deploy<P: WalletProvider>(
    resolver: &Resolver<P>,
    artifact: &Artifact,
    options: DeployOptions,
) -> Result<Deployment> {
    let accessor = resolver.resolve(true).await?;
    let from = accessor.signer().ok_or(Error::NoAccounts)?;

    let request = TransactionRequest {
        from,
        to: None,
        data: artifact.init_code(options.capacity)?,
    };

    info!(
        "Deploying {} with capacity {} from {from}",
        artifact.contract_name, options.capacity
    );
    let submit = async {
        let hash = accessor.provider().send_transaction(&request).await?;
        debug!("Creation transaction {hash}");

        let receipt = PendingTransaction::new(accessor.provider(), hash)
            .interval(options.poll_interval)
            .wait()
            .await?;
        let address = receipt
            .contract_address
            .ok_or(Error::MissingContractAddress(hash))?;

        Ok::<_, Error>(Deployment {
            address,
            transaction_hash: hash,
            block_number: receipt.block_number,
        })
    };

    tokio::time::timeout(options.timeout, submit)
        .await
        .map_err(|_| Error::Timeout(options.timeout))?
}
