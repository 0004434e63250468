// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

/// Numeric chain identifier (EIP-155).
pub type ChainId = u64;

/// The single network the dapp accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Name shown to the user.
    pub name: String,
    /// Chain id the wallet must report.
    pub chain_id: ChainId,
}

impl Network {
    /// Goerli test network, chain id 5.
    #[must_use]
    pub fn goerli() -> Self {
        Self {
            name: "goerli".to_string(),
            chain_id: 5,
        }
    }

    /// Whether the given chain id belongs to this network.
    #[must_use]
    pub fn accepts(&self, chain_id: ChainId) -> bool {
        self.chain_id == chain_id
    }

    /// Message shown when the wallet sits on another network.
    #[must_use]
    pub fn mismatch_alert(&self) -> String {
        format!("You are not on the {} network", self.name)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::goerli()
    }
}
