// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::{network::ChainId, primitives::TxHash};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the wallet, the contract or the chain.
#[derive(Debug, Error)]
pub enum Error {
    /// The user refused the wallet connection or signature request.
    #[error("wallet connection rejected: {0}")]
    WalletRejected(String),

    /// The wallet exposes no account to sign with.
    #[error("the connected wallet exposes no accounts")]
    NoAccounts,

    /// The wallet is attached to a network other than the accepted one.
    #[error("switch your network to {network} (expected chain id {expected}, got {actual})")]
    WrongNetwork {
        /// Human readable name of the accepted network.
        network: String,
        /// Accepted chain id.
        expected: ChainId,
        /// Chain id reported by the wallet.
        actual: ChainId,
    },

    /// A state-changing call was attempted through a read-only accessor.
    #[error("a signing accessor is required for '{0}'")]
    SignerRequired(&'static str),

    /// The function is not part of the contract schema.
    #[error("unknown contract function '{0}'")]
    UnknownFunction(String),

    /// Arguments or return data do not match the schema.
    #[error("ABI error: {0}")]
    Abi(String),

    /// The contract rejected the call or transaction.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// JSON-RPC error object returned by the endpoint.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Malformed address string.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// Malformed hex payload.
    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    /// A creation transaction was mined without producing a contract.
    #[error("transaction {0} did not create a contract")]
    MissingContractAddress(TxHash),

    /// The compiled contract artifact is missing or unusable.
    #[error("invalid contract artifact {path}: {reason}")]
    Artifact {
        /// Artifact location.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The configuration file cannot be read.
    #[error("cannot read configuration {path}: {reason}")]
    Config {
        /// Configuration file location.
        path: PathBuf,
        /// Why it cannot be read.
        reason: String,
    },

    /// The operation did not complete in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this is the wrong-network abort, the only failure the view
    /// controller hands back to its caller.
    #[must_use]
    pub fn is_wrong_network(&self) -> bool {
        matches!(self, Self::WrongNetwork { .. })
    }
}
