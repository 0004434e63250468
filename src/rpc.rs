// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! [`WalletProvider`] over Ethereum JSON-RPC (HTTP).
//!
//! The endpoint is expected to manage keys itself, as a browser wallet
//! bridge or a development node with unlocked accounts does.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::{debug, trace};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    abi,
    error::{Error, Result},
    network::ChainId,
    primitives::{decode_hex, encode_hex, Address, TxHash},
    provider::{CallRequest, Receipt, TransactionRequest, WalletProvider},
};

const JSON_RPC_VERSION: &str = "2.0";

/// EIP-1193 "user rejected the request".
const USER_REJECTED: i64 = 4001;
/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;
/// Execution error code used by geth and hardhat for reverts.
const EXECUTION_REVERTED: i64 = 3;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_error(self) -> Error {
        if self.code == USER_REJECTED {
            return Error::WalletRejected(self.message);
        }

        let revert_reason = self
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|data| decode_hex(data).ok())
            .and_then(|data| abi::decode_revert(&data));

        match revert_reason {
            Some(reason) => Error::Reverted(reason),
            None if self.code == EXECUTION_REVERTED || self.message.contains("revert") => {
                Error::Reverted(self.message)
            }
            None => Error::Rpc {
                code: self.code,
                message: self.message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_address: Option<Address>,
}

impl RpcReceipt {
    // Some endpoints return a receipt without a block while the
    // transaction is still pending.
    fn into_receipt(self) -> Result<Option<Receipt>> {
        let Some(block) = self.block_number else {
            return Ok(None);
        };
        let success = match self.status {
            Some(status) => parse_quantity(&status)? == 1,
            None => true,
        };

        Ok(Some(Receipt {
            transaction_hash: self.transaction_hash,
            block_number: parse_quantity(&block)?,
            success,
            contract_address: self.contract_address,
        }))
    }
}

/// Parses a JSON-RPC hex quantity such as `0x5`.
///
/// # Errors
/// [`Error::InvalidHex`] without the `0x` prefix or with non-hex digits.
pub fn parse_quantity(value: &str) -> Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidHex(format!("{value}: missing 0x prefix")))?;
    u64::from_str_radix(digits, 16).map_err(|err| Error::InvalidHex(format!("{value}: {err}")))
}

fn transaction_object(request: &TransactionRequest) -> Value {
    let mut object = json!({
        "from": request.from,
        "data": encode_hex(&request.data),
    });
    if let Some(to) = request.to {
        object["to"] = json!(to);
    }
    object
}

/// JSON-RPC wallet endpoint.
#[derive(Debug)]
pub struct JsonRpcProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    /// Provider talking to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id,
            method,
            params,
        };

        if log::log_enabled!(log::Level::Trace) {
            trace!("-> {}", serde_json::to_string(&body)?);
        }

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            debug!("{method} failed: {} ({})", error.message, error.code);
            return Err(error.into_error());
        }

        Ok(serde_json::from_value(
            response.result.unwrap_or(Value::Null),
        )?)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn connect(&self) -> Result<Vec<Address>> {
        match self.request("eth_requestAccounts", json!([])).await {
            Err(Error::Rpc {
                code: METHOD_NOT_FOUND,
                ..
            }) => self.accounts().await,
            other => other,
        }
    }

    async fn chain_id(&self) -> Result<ChainId> {
        let id: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&id)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let params = json!([
            { "to": request.to, "data": encode_hex(&request.data) },
            "latest",
        ]);
        let data: String = self.request("eth_call", params).await?;
        decode_hex(&data)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash> {
        self.request("eth_sendTransaction", json!([transaction_object(request)]))
            .await
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        let receipt: Option<RpcReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        match receipt {
            Some(receipt) => receipt.into_receipt(),
            None => Ok(None),
        }
    }
}
