// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! An in-memory chain with an unlocked wallet.
//!
//! [`Devnet`] implements [`WalletProvider`] and executes the register
//! contract natively: capacity bound, one membership per address, and the
//! same revert behaviour a node reports for a failing transaction. Every
//! transaction is mined into its own block immediately.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use log::debug;

use crate::{
    abi::{self, Token, WORD},
    error::{Error, Result},
    network::ChainId,
    primitives::{keccak256, Address, TxHash},
    provider::{CallRequest, Receipt, TransactionRequest, WalletProvider},
    schema::{
        REGISTER, JOIN_WALLET_TO_REG, MAX_WALLET_FOR_REG, NUM_WALLET_IN_REG, WALLET_IN_REG,
    },
};

/// Revert reason for a second join from the same address.
pub const ALREADY_JOINED: &str = "Sender has already joined the register";
/// Revert reason once the capacity is reached.
pub const REGISTER_FULL: &str = "Limit reached, no more wallets can join";

/// State of one deployed register contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterState {
    /// Maximum number of members.
    pub capacity: u8,
    /// Number of members.
    pub count: u8,
    /// Member addresses.
    pub members: BTreeSet<Address>,
}

impl RegisterState {
    fn execute(&mut self, from: Option<Address>, data: &[u8]) -> Result<Vec<u8>> {
        let (selector, args) = abi::split_call(data)?;
        let function = REGISTER
            .function_by_selector(selector)
            .ok_or_else(|| Error::Reverted("function selector was not recognized".to_string()))?;
        let inputs = abi::decode(function.inputs, args)?;

        let output = match function.name {
            MAX_WALLET_FOR_REG => vec![Token::Uint8(self.capacity)],
            NUM_WALLET_IN_REG => vec![Token::Uint8(self.count)],
            WALLET_IN_REG => {
                let address = inputs
                    .first()
                    .copied()
                    .ok_or_else(|| Error::Abi("missing address argument".to_string()))?
                    .into_address()?;
                vec![Token::Bool(self.members.contains(&address))]
            }
            JOIN_WALLET_TO_REG => {
                let sender = from.unwrap_or_default();
                if self.members.contains(&sender) {
                    return Err(Error::Reverted(ALREADY_JOINED.to_string()));
                }
                if self.count >= self.capacity {
                    return Err(Error::Reverted(REGISTER_FULL.to_string()));
                }
                self.members.insert(sender);
                self.count += 1;
                Vec::new()
            }
            other => return Err(Error::UnknownFunction(other.to_string())),
        };

        abi::encode_args(function.outputs, &output)
    }
}

#[derive(Debug, Default)]
struct Ledger {
    chain_id: ChainId,
    accounts: Vec<Address>,
    reject_connections: bool,
    stall_transactions: bool,
    block_number: u64,
    installed: u64,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, RegisterState>,
    receipts: HashMap<TxHash, Receipt>,
}

impl Ledger {
    fn next_nonce(&mut self, from: Address) -> u64 {
        let nonce = self.nonces.entry(from).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn create(&mut self, from: Address, init_code: &[u8]) -> Result<Address> {
        if init_code.len() <= WORD {
            return Err(Error::Reverted(
                "creation code is missing or has no constructor argument".to_string(),
            ));
        }
        let (_, ctor_args) = init_code.split_at(init_code.len() - WORD);
        let capacity = abi::decode(REGISTER.constructor.inputs, ctor_args)?
            .first()
            .copied()
            .ok_or_else(|| Error::Abi("missing constructor argument".to_string()))?
            .into_uint8()?;

        let nonce = self.nonces.get(&from).copied().unwrap_or_default();
        let address = derive_address(from, nonce);
        self.contracts.insert(
            address,
            RegisterState {
                capacity,
                ..RegisterState::default()
            },
        );
        Ok(address)
    }

    fn mine(&mut self, from: Address, data: &[u8], contract_address: Option<Address>) -> TxHash {
        let nonce = self.next_nonce(from);
        self.block_number += 1;

        let mut preimage = from.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(data);
        let hash = TxHash::new(keccak256(preimage));

        self.receipts.insert(
            hash,
            Receipt {
                transaction_hash: hash,
                block_number: self.block_number,
                success: true,
                contract_address,
            },
        );
        hash
    }
}

fn derive_address(from: Address, nonce: u64) -> Address {
    let mut preimage = from.as_bytes().to_vec();
    preimage.extend_from_slice(&nonce.to_be_bytes());
    let hash = keccak256(preimage);
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hash[12..]);
    Address::new(raw)
}

/// In-memory chain with an unlocked wallet.
#[derive(Debug)]
pub struct Devnet {
    ledger: Mutex<Ledger>,
}

impl Devnet {
    /// A chain with id `chain_id` and a single funded dev account.
    #[must_use]
    pub fn new(chain_id: ChainId) -> Self {
        Self::with_accounts(chain_id, vec![Self::dev_account(0)])
    }

    /// A chain exposing the given accounts, in order.
    #[must_use]
    pub fn with_accounts(chain_id: ChainId, accounts: Vec<Address>) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                chain_id,
                accounts,
                ..Ledger::default()
            }),
        }
    }

    /// Deterministic dev account number `index`.
    #[must_use]
    pub fn dev_account(index: u32) -> Address {
        let hash = keccak256(format!("register-dapp devnet account {index}"));
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&hash[12..]);
        Address::new(raw)
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Places a register contract with `capacity` directly into state.
    #[must_use]
    pub fn install_register(&self, capacity: u8) -> Address {
        let mut chain = self.lock();
        let address = derive_address(Address::default(), chain.installed);
        chain.installed += 1;
        chain.contracts.insert(
            address,
            RegisterState {
                capacity,
                ..RegisterState::default()
            },
        );
        address
    }

    /// Snapshot of a register contract's state.
    #[must_use]
    pub fn register_state(&self, address: &Address) -> Option<RegisterState> {
        self.lock().contracts.get(address).cloned()
    }

    /// Switches the network the wallet reports.
    pub fn set_chain_id(&self, chain_id: ChainId) {
        self.lock().chain_id = chain_id;
    }

    /// Makes the wallet refuse connection requests.
    pub fn set_reject_connections(&self, reject: bool) {
        self.lock().reject_connections = reject;
    }

    /// Makes submitted transactions hang forever.
    pub fn set_stall_transactions(&self, stall: bool) {
        self.lock().stall_transactions = stall;
    }

    /// Height of the latest block.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.lock().block_number
    }
}

#[async_trait]
impl WalletProvider for Devnet {
    async fn connect(&self) -> Result<Vec<Address>> {
        let chain = self.lock();
        if chain.reject_connections {
            return Err(Error::WalletRejected("user rejected the request".to_string()));
        }
        Ok(chain.accounts.clone())
    }

    async fn chain_id(&self) -> Result<ChainId> {
        Ok(self.lock().chain_id)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.lock().accounts.clone())
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let chain = self.lock();
        match chain.contracts.get(&request.to) {
            // Calls are executed against a scratch copy and never committed.
            Some(contract) => contract.clone().execute(None, &request.data),
            None => Ok(Vec::new()),
        }
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash> {
        let stall = self.lock().stall_transactions;
        if stall {
            std::future::pending::<()>().await;
        }

        let mut chain = self.lock();
        if !chain.accounts.contains(&request.from) {
            return Err(Error::Rpc {
                code: -32000,
                message: format!("unknown account {}", request.from),
            });
        }

        let contract_address = match request.to {
            None => Some(chain.create(request.from, &request.data)?),
            Some(to) => {
                let contract = chain
                    .contracts
                    .get_mut(&to)
                    .ok_or_else(|| Error::Reverted(format!("no contract at {to}")))?;
                contract.execute(Some(request.from), &request.data)?;
                None
            }
        };

        let hash = chain.mine(request.from, &request.data, contract_address);
        debug!("Devnet mined {hash} in block {}", chain.block_number);
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        Ok(self.lock().receipts.get(hash).cloned())
    }
}
