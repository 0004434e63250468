// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The wallet boundary.
//!
//! [`WalletProvider`] is whatever holds the user's keys and talks to the
//! chain. [`Resolver`] owns one provider, connects to it lazily, checks the
//! network and hands out [`Accessor`]s for a single operation.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::OnceCell;

use crate::{
    error::{Error, Result},
    network::{ChainId, Network},
    primitives::{Address, TxHash},
};

/// Interval between receipt polls while waiting for a transaction.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Shortest accepted receipt polling interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Contract address.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Vec<u8>,
}

/// A transaction to be signed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Signing account.
    pub from: Address,
    /// Target contract, `None` for a contract creation.
    pub to: Option<Address>,
    /// Calldata, or init code for a creation.
    pub data: Vec<u8>,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the mined transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Whether execution succeeded.
    pub success: bool,
    /// Address of the created contract, for creations.
    pub contract_address: Option<Address>,
}

/// A wallet able to read chain state and sign transactions.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for access; may prompt the user.
    ///
    /// # Errors
    /// [`Error::WalletRejected`] when the user declines.
    async fn connect(&self) -> Result<Vec<Address>>;

    /// Chain id the wallet is attached to.
    ///
    /// # Errors
    /// Transport or wallet failures.
    async fn chain_id(&self) -> Result<ChainId>;

    /// Accounts currently exposed by the wallet.
    ///
    /// # Errors
    /// Transport or wallet failures.
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Executes a read-only call and returns the raw return data.
    ///
    /// # Errors
    /// [`Error::Reverted`] when the call reverts.
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>>;

    /// Signs and submits a transaction.
    ///
    /// # Errors
    /// [`Error::WalletRejected`] when the user declines signing,
    /// [`Error::Reverted`] when the wallet's gas estimate reverts.
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash>;

    /// Receipt of a transaction, `None` while it is pending.
    ///
    /// # Errors
    /// Transport or wallet failures.
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>>;
}

/// Surfaces a disruptive message to the user.
pub trait Alert: Send + Sync {
    /// Shows `message`.
    fn alert(&self, message: &str);
}

/// Alert sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        warn!("{message}");
    }
}

/// Capability bound to a checked connection, valid for one operation.
#[derive(Clone, Copy)]
pub enum Accessor<'a> {
    /// Can query contract state.
    ReadOnly(&'a dyn WalletProvider),
    /// Can query and submit transactions as `signer`.
    Signing {
        /// Underlying wallet.
        provider: &'a dyn WalletProvider,
        /// Account transactions are signed with.
        signer: Address,
    },
}

impl<'a> Accessor<'a> {
    /// Underlying wallet.
    #[must_use]
    pub fn provider(&self) -> &'a dyn WalletProvider {
        match self {
            Self::ReadOnly(provider) | Self::Signing { provider, .. } => *provider,
        }
    }

    /// Signing account, if this accessor can write.
    #[must_use]
    pub fn signer(&self) -> Option<Address> {
        match self {
            Self::ReadOnly(_) => None,
            Self::Signing { signer, .. } => Some(*signer),
        }
    }
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly(_) => f.write_str("Accessor::ReadOnly"),
            Self::Signing { signer, .. } => write!(f, "Accessor::Signing({signer})"),
        }
    }
}

#[derive(Debug)]
struct Connection {
    accounts: Vec<Address>,
}

/// Resolves read-only or signing accessors from one wallet.
pub struct Resolver<P> {
    provider: P,
    network: Network,
    alert: Arc<dyn Alert>,
    connection: OnceCell<Connection>,
}

impl<P: WalletProvider> Resolver<P> {
    /// Resolver accepting only `network`, alerting through the log.
    #[must_use]
    pub fn new(provider: P, network: Network) -> Self {
        Self {
            provider,
            network,
            alert: Arc::new(LogAlert),
            connection: OnceCell::new(),
        }
    }

    /// Replaces the alert sink.
    #[must_use]
    pub fn with_alert(mut self, alert: Arc<dyn Alert>) -> Self {
        self.alert = alert;
        self
    }

    /// Underlying wallet.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Accepted network.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Whether the wallet connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Connects if needed, checks the network and returns an accessor.
    ///
    /// # Errors
    /// A rejected connection is returned as is and retried on the next call.
    /// A network mismatch alerts the user and aborts with
    /// [`Error::WrongNetwork`]. A signing request on a wallet without
    /// accounts fails with [`Error::NoAccounts`].
    pub async fn resolve(&self, need_signer: bool) -> Result<Accessor<'_>> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let accounts = self.provider.connect().await?;
                debug!("Wallet connected with {} account(s)", accounts.len());
                Ok::<_, Error>(Connection { accounts })
            })
            .await?;

        let actual = self.provider.chain_id().await?;
        if !self.network.accepts(actual) {
            self.alert.alert(&self.network.mismatch_alert());
            return Err(Error::WrongNetwork {
                network: self.network.name.clone(),
                expected: self.network.chain_id,
                actual,
            });
        }

        if !need_signer {
            return Ok(Accessor::ReadOnly(&self.provider));
        }

        let signer = self
            .provider
            .accounts()
            .await?
            .first()
            .or_else(|| connection.accounts.first())
            .copied()
            .ok_or(Error::NoAccounts)?;

        Ok(Accessor::Signing {
            provider: &self.provider,
            signer,
        })
    }
}

impl<P> fmt::Debug for Resolver<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("network", &self.network)
            .field("connected", &self.connection.initialized())
            .finish_non_exhaustive()
    }
}

/// A submitted transaction awaiting its receipt.
#[derive(Clone, Copy)]
pub struct PendingTransaction<'a> {
    provider: &'a dyn WalletProvider,
    hash: TxHash,
    interval: Duration,
}

impl<'a> PendingTransaction<'a> {
    /// Tracks `hash` on `provider`.
    #[must_use]
    pub fn new(provider: &'a dyn WalletProvider, hash: TxHash) -> Self {
        Self {
            provider,
            hash,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the receipt polling interval, no shorter than
    /// [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Polls until the transaction is mined.
    ///
    /// # Errors
    /// A mined but failed transaction yields [`Error::Reverted`]. Provider
    /// failures are returned as is.
    pub async fn wait(self) -> Result<Receipt> {
        loop {
            if let Some(receipt) = self.provider.transaction_receipt(&self.hash).await? {
                if !receipt.success {
                    return Err(Error::Reverted(format!(
                        "transaction {} failed in block {}",
                        self.hash, receipt.block_number
                    )));
                }
                debug!(
                    "Transaction {} confirmed in block {}",
                    self.hash, receipt.block_number
                );
                return Ok(receipt);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl fmt::Debug for PendingTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::devnet::Devnet;

    #[derive(Default)]
    struct RecordingAlert(Mutex<Vec<String>>);

    impl Alert for RecordingAlert {
        fn alert(&self, message: &str) {
            self.0.lock().expect("alert log").push(message.to_string());
        }
    }

    #[tokio::test]
    async fn wrong_network_alerts_and_aborts() {
        let alert = Arc::new(RecordingAlert::default());
        let resolver = Resolver::new(Devnet::new(1), Network::goerli()).with_alert(alert.clone());

        let err = resolver.resolve(false).await.expect_err("mainnet is refused");
        assert!(matches!(
            err,
            Error::WrongNetwork {
                expected: 5,
                actual: 1,
                ..
            }
        ));
        assert_eq!(
            alert.0.lock().expect("alert log").as_slice(),
            ["You are not on the goerli network"]
        );
    }

    #[tokio::test]
    async fn rejected_connection_is_retried() {
        let devnet = Devnet::new(5);
        devnet.set_reject_connections(true);
        let resolver = Resolver::new(devnet, Network::goerli());

        let err = resolver.resolve(false).await.expect_err("rejected");
        assert!(matches!(err, Error::WalletRejected(_)));
        assert!(!resolver.is_connected());

        resolver.provider().set_reject_connections(false);
        resolver.resolve(false).await.expect("second attempt connects");
        assert!(resolver.is_connected());
    }

    #[tokio::test]
    async fn signer_is_first_wallet_account() {
        let accounts = vec![Devnet::dev_account(3), Devnet::dev_account(4)];
        let resolver = Resolver::new(Devnet::with_accounts(5, accounts.clone()), Network::goerli());

        let accessor = resolver.resolve(true).await.expect("signing accessor");
        assert_eq!(accessor.signer(), Some(accounts[0]));

        let accessor = resolver.resolve(false).await.expect("read-only accessor");
        assert_eq!(accessor.signer(), None);
    }

    #[tokio::test]
    async fn signing_without_accounts_fails() {
        let resolver = Resolver::new(Devnet::with_accounts(5, Vec::new()), Network::goerli());
        let err = resolver.resolve(true).await.expect_err("nothing to sign with");
        assert!(matches!(err, Error::NoAccounts));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let devnet = Devnet::new(5);
        let hash = TxHash::new([1; 32]);

        let pending = PendingTransaction::new(&devnet, hash).interval(Duration::ZERO);
        assert_eq!(pending.interval, MIN_POLL_INTERVAL);

        let pending = pending.interval(Duration::from_secs(2));
        assert_eq!(pending.interval, Duration::from_secs(2));
    }
}
