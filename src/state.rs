// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! View state and the controller that drives it.
//!
//! [`ViewState`] only changes through [`ViewState::apply`]. The
//! [`Controller`] turns the two user-facing triggers (page ready and join
//! clicked) into contract calls and feeds the results back as [`Action`]s.

use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::{
    client::RegisterContract,
    config::Config,
    error::{Error, Result},
    provider::{Alert, Resolver, WalletProvider, DEFAULT_POLL_INTERVAL},
    schema::ContractDescriptor,
};

/// Default bound on a join waiting for confirmation.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Observable UI state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    /// A connection attempt is in progress.
    pub connecting: bool,
    /// The wallet is connected on the accepted network.
    pub connected: bool,
    /// The connected address is a member.
    pub joined: bool,
    /// A join transaction is in flight.
    pub loading: bool,
    /// Last observed registrant count.
    pub count: u8,
}

/// State transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A connection attempt started.
    ConnectStarted,
    /// The connection attempt failed or was aborted.
    ConnectFailed,
    /// The wallet is connected on the accepted network.
    Connected,
    /// Membership flag read from the contract.
    MembershipLoaded(bool),
    /// Registrant count read from the contract.
    CountLoaded(u8),
    /// A join transaction is being submitted.
    JoinSubmitted,
    /// The join transaction was confirmed.
    JoinConfirmed,
    /// The join failed, timed out or was cancelled.
    JoinFailed,
}

/// Coarse phase derived from [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not connected.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected, not a member, idle.
    Unjoined,
    /// Join transaction in flight.
    Joining,
    /// Connected member. Terminal for the session.
    Joined,
}

impl ViewState {
    /// Reducer: the state after `action`.
    #[must_use]
    pub fn apply(self, action: Action) -> Self {
        match action {
            Action::ConnectStarted => Self {
                connecting: true,
                ..self
            },
            Action::ConnectFailed => Self {
                connecting: false,
                connected: false,
                ..self
            },
            Action::Connected => Self {
                connecting: false,
                connected: true,
                ..self
            },
            Action::MembershipLoaded(joined) => Self { joined, ..self },
            // A stale read never lowers the count within a session.
            Action::CountLoaded(count) => Self {
                count: self.count.max(count),
                ..self
            },
            Action::JoinSubmitted => Self {
                loading: true,
                ..self
            },
            Action::JoinConfirmed => Self {
                loading: false,
                joined: true,
                ..self
            },
            Action::JoinFailed => Self {
                loading: false,
                ..self
            },
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.connected, self.joined, self.loading) {
            (false, _, _) if self.connecting => Phase::Connecting,
            (false, _, _) => Phase::Disconnected,
            (true, true, _) => Phase::Joined,
            (true, false, true) => Phase::Joining,
            (true, false, false) => Phase::Unjoined,
        }
    }
}

/// Cancels an in-flight join from outside the controller.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: watch::Sender<bool>,
}

impl CancelToken {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Requests cancellation. Pending and future joins of this controller
    /// resolve as cancelled until [`Self::reset`] is called.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Clears a previous cancellation.
    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` only errs if it is dropped.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Drives [`ViewState`] from wallet and contract events.
#[derive(Debug)]
pub struct Controller<P> {
    resolver: Resolver<P>,
    descriptor: ContractDescriptor,
    state: ViewState,
    join_timeout: Duration,
    poll_interval: Duration,
    cancel: CancelToken,
}

impl<P: WalletProvider> Controller<P> {
    /// Controller for the register at `descriptor`.
    #[must_use]
    pub fn new(resolver: Resolver<P>, descriptor: ContractDescriptor) -> Self {
        Self {
            resolver,
            descriptor,
            state: ViewState::default(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancelToken::new(),
        }
    }

    /// Controller configured from `config`, reporting wrong networks
    /// through `alert`.
    ///
    /// # Errors
    /// [`Error::InvalidAddress`] if the configured contract address does not
    /// parse.
    pub fn from_config(provider: P, config: &Config, alert: Arc<dyn Alert>) -> Result<Self> {
        let resolver = Resolver::new(provider, config.network()).with_alert(alert);
        Ok(Self::new(resolver, config.descriptor()?)
            .with_join_timeout(config.confirmation_timeout())
            .with_poll_interval(config.poll_interval()))
    }

    /// Bounds how long a join may wait for confirmation.
    #[must_use]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Sets the receipt polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Resolver owning the wallet connection.
    #[must_use]
    pub fn resolver(&self) -> &Resolver<P> {
        &self.resolver
    }

    /// Handle that cancels an in-flight join.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn dispatch(&mut self, action: Action) {
        let next = self.state.apply(action);
        debug!("{action:?}: {:?} -> {:?}", self.state.phase(), next.phase());
        self.state = next;
    }

    /// Page became ready: connect if needed, then load membership and count.
    ///
    /// # Errors
    /// Only [`Error::WrongNetwork`] is returned; other failures are logged.
    pub async fn page_ready(&mut self) -> Result<()> {
        if self.state.connected {
            return Ok(());
        }

        self.dispatch(Action::ConnectStarted);
        if let Err(err) = self.resolver.resolve(false).await {
            self.dispatch(Action::ConnectFailed);
            return swallow("connect", err);
        }
        self.dispatch(Action::Connected);
        info!("Wallet connected on {}", self.resolver.network().name);

        match self.load_membership().await {
            Ok(joined) => self.dispatch(Action::MembershipLoaded(joined)),
            Err(err) => swallow("membership read", err)?,
        }
        self.refresh_count().await
    }

    /// Join clicked: submit the join and wait for confirmation.
    ///
    /// Ignored unless the phase is [`Phase::Unjoined`]. A failure, timeout
    /// or cancellation resets the loading flag.
    ///
    /// # Errors
    /// Only [`Error::WrongNetwork`] is returned; other failures are logged.
    pub async fn join_clicked(&mut self) -> Result<()> {
        if self.state.phase() != Phase::Unjoined {
            debug!("Join ignored in phase {:?}", self.state.phase());
            return Ok(());
        }

        self.dispatch(Action::JoinSubmitted);
        let outcome = {
            let join = self.join();
            let cancel = self.cancel.clone();
            tokio::select! {
                result = tokio::time::timeout(self.join_timeout, join) => {
                    result.unwrap_or(Err(Error::Timeout(self.join_timeout)))
                }
                () = cancel.cancelled() => Err(Error::Cancelled),
            }
        };

        match outcome {
            Ok(()) => {
                self.dispatch(Action::JoinConfirmed);
                info!("Joined the register");
                self.refresh_count().await
            }
            Err(err) => {
                self.dispatch(Action::JoinFailed);
                swallow("join", err)
            }
        }
    }

    async fn join(&self) -> Result<()> {
        let accessor = self.resolver.resolve(true).await?;
        RegisterContract::new(&self.descriptor, accessor)
            .with_poll_interval(self.poll_interval)
            .submit_join()
            .await
            .map(|_| ())
    }

    async fn load_membership(&self) -> Result<bool> {
        let accessor = self.resolver.resolve(true).await?;
        let contract = RegisterContract::new(&self.descriptor, accessor);
        let signer = contract
            .signer()
            .ok_or(Error::SignerRequired("walletInReg"))?;
        contract.read_membership(&signer).await
    }

    async fn refresh_count(&mut self) -> Result<()> {
        let count = {
            let accessor = match self.resolver.resolve(false).await {
                Ok(accessor) => accessor,
                Err(err) => return swallow("count read", err),
            };
            RegisterContract::new(&self.descriptor, accessor)
                .read_count()
                .await
        };

        match count {
            Ok(count) => {
                self.dispatch(Action::CountLoaded(count));
                Ok(())
            }
            Err(err) => swallow("count read", err),
        }
    }
}

// Wrong network is the one failure the caller must see; the rest is logged.
fn swallow(operation: &str, err: Error) -> Result<()> {
    if err.is_wrong_network() {
        warn!("{operation} aborted: {err}");
        return Err(err);
    }
    error!("{operation} failed: {err}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(joined: bool, loading: bool) -> ViewState {
        ViewState {
            connected: true,
            joined,
            loading,
            ..ViewState::default()
        }
    }

    #[test]
    fn phases_follow_the_linear_flow() {
        let mut state = ViewState::default();
        assert_eq!(state.phase(), Phase::Disconnected);

        state = state.apply(Action::ConnectStarted);
        assert_eq!(state.phase(), Phase::Connecting);

        state = state.apply(Action::Connected);
        assert_eq!(state.phase(), Phase::Unjoined);

        state = state.apply(Action::JoinSubmitted);
        assert_eq!(state.phase(), Phase::Joining);

        state = state.apply(Action::JoinConfirmed);
        assert_eq!(state.phase(), Phase::Joined);
        assert!(!state.loading);
    }

    #[test]
    fn failed_join_clears_loading() {
        let state = connected(false, true).apply(Action::JoinFailed);
        assert_eq!(state, connected(false, false));
    }

    #[test]
    fn failed_connect_returns_to_disconnected() {
        let state = ViewState::default()
            .apply(Action::ConnectStarted)
            .apply(Action::ConnectFailed);
        assert_eq!(state.phase(), Phase::Disconnected);
    }

    #[test]
    fn count_never_decreases() {
        let state = ViewState::default()
            .apply(Action::CountLoaded(3))
            .apply(Action::CountLoaded(2));
        assert_eq!(state.count, 3);
    }

    #[test]
    fn joined_wins_over_loading() {
        assert_eq!(connected(true, true).phase(), Phase::Joined);
    }

    #[test]
    fn cancel_token_is_resettable() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }
}
