// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::time::Duration;

use log::debug;

use crate::{
    abi::{self, Token},
    error::{Error, Result},
    primitives::Address,
    provider::{
        Accessor, CallRequest, PendingTransaction, Receipt, TransactionRequest,
        DEFAULT_POLL_INTERVAL,
    },
    schema::{
        ContractDescriptor, JOIN_WALLET_TO_REG, MAX_WALLET_FOR_REG, NUM_WALLET_IN_REG,
        WALLET_IN_REG,
    },
};

/// Register contract bound to an accessor.
///
/// Bounds such as capacity and duplicate joins are enforced by the contract;
/// its rejections come back as [`Error::Reverted`].
#[derive(Debug, Clone, Copy)]
pub struct RegisterContract<'a> {
    descriptor: &'a ContractDescriptor,
    accessor: Accessor<'a>,
    poll_interval: Duration,
}

impl<'a> RegisterContract<'a> {
    /// Binds `descriptor` to `accessor`.
    #[must_use]
    pub fn new(descriptor: &'a ContractDescriptor, accessor: Accessor<'a>) -> Self {
        Self {
            descriptor,
            accessor,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the receipt polling interval used by [`Self::submit_join`].
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Signing account of the bound accessor.
    #[must_use]
    pub fn signer(&self) -> Option<Address> {
        self.accessor.signer()
    }

    /// Maximum number of registrants.
    ///
    /// # Errors
    /// Call failures, or return data that does not decode.
    pub async fn read_capacity(&self) -> Result<u8> {
        self.read_one(MAX_WALLET_FOR_REG, &[]).await?.into_uint8()
    }

    /// Current number of registrants.
    ///
    /// # Errors
    /// Call failures, or return data that does not decode.
    pub async fn read_count(&self) -> Result<u8> {
        self.read_one(NUM_WALLET_IN_REG, &[]).await?.into_uint8()
    }

    /// Whether `address` has joined.
    ///
    /// # Errors
    /// Call failures, or return data that does not decode.
    pub async fn read_membership(&self, address: &Address) -> Result<bool> {
        self.read_one(WALLET_IN_REG, &[Token::Address(*address)])
            .await?
            .into_bool()
    }

    /// Joins the signer to the register and waits for confirmation.
    ///
    /// # Errors
    /// [`Error::SignerRequired`] on a read-only accessor, [`Error::Reverted`]
    /// for a duplicate join or a full register, and wallet rejections.
    pub async fn submit_join(&self) -> Result<Receipt> {
        let function = self.descriptor.schema.function(JOIN_WALLET_TO_REG)?;
        let from = self
            .accessor
            .signer()
            .ok_or(Error::SignerRequired(JOIN_WALLET_TO_REG))?;

        let request = TransactionRequest {
            from,
            to: Some(self.descriptor.address),
            data: abi::encode_call(function, &[])?,
        };

        let provider = self.accessor.provider();
        let hash = provider.send_transaction(&request).await?;
        debug!("Submitted {JOIN_WALLET_TO_REG} from {from} as {hash}");

        PendingTransaction::new(provider, hash)
            .interval(self.poll_interval)
            .wait()
            .await
    }

    async fn read_one(&self, name: &str, args: &[Token]) -> Result<Token> {
        let function = self.descriptor.schema.function(name)?;
        if !function.is_view() {
            return Err(Error::Abi(format!("'{name}' is not a view function")));
        }

        let request = CallRequest {
            to: self.descriptor.address,
            data: abi::encode_call(function, args)?,
        };
        let data = self.accessor.provider().call(&request).await?;
        debug!("{name} returned {} bytes", data.len());

        abi::decode(function.outputs, &data)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Abi(format!("'{name}' returned no value")))
    }
}
