// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Client, view state and deployment tooling for the register allow-list
//! contract.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unused_must_use)]
#![deny(unused_extern_crates)]
#![deny(clippy::pedantic)]
#![warn(missing_debug_implementations, unreachable_pub, rustdoc::all)]

/// ABI encoding and decoding for the register contract's types.
pub mod abi;
/// Typed calls against a deployed register contract.
pub mod client;
/// Runtime configuration.
pub mod config;
/// Contract deployment.
pub mod deploy;
/// In-memory chain used for simulation and tests.
pub mod devnet;
/// Error types.
pub mod error;
/// Accepted network identity.
pub mod network;
/// Address and transaction hash primitives.
pub mod primitives;
/// Wallet provider boundary and accessor resolution.
pub mod provider;
/// Pure rendering of the view state.
pub mod render;
/// Ethereum JSON-RPC wallet provider.
pub mod rpc;
/// Contract schema types and the register ABI.
pub mod schema;
/// View state, reducer and controller.
pub mod state;

pub use error::{Error, Result};
