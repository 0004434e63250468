// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Schema types for contract metadata.
//!
//! A [`ContractSchema`] describes the callable surface of a deployed
//! contract: names, argument and return types, and mutability. It carries
//! no behaviour; the client uses it to encode calls and decode results.

use serde::Serialize;

use crate::{
    abi,
    error::{Error, Result},
    primitives::Address,
};

/// Address of the deployed register contract.
pub const REGISTER_CONTRACT_ADDRESS: &str = "0x5c644F62dBc0E018643715830e9DF4DD04D6c0f9";

/// ABI parameter types used by the register contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// 20-byte address.
    Address,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Boolean.
    Bool,
}

impl ParamType {
    /// Canonical ABI type name.
    #[must_use]
    pub fn canonical(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint8 => "uint8",
            Self::Bool => "bool",
        }
    }
}

/// Whether a function reads or mutates contract state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    /// Read-only; served by `eth_call`.
    View,
    /// State-changing without value transfer; needs a transaction.
    NonPayable,
}

impl StateMutability {
    /// ABI JSON spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::NonPayable => "nonpayable",
        }
    }
}

/// Schema for a function parameter or return value.
#[derive(Debug, Clone, Copy)]
pub struct ParamSchema {
    /// Parameter name, empty for unnamed parameters.
    pub name: &'static str,
    /// Parameter type.
    pub kind: ParamType,
}

/// Schema for a contract function.
#[derive(Debug, Clone, Copy)]
pub struct FunctionSchema {
    /// Function name.
    pub name: &'static str,
    /// Input parameters.
    pub inputs: &'static [ParamSchema],
    /// Return values.
    pub outputs: &'static [ParamSchema],
    /// State mutability.
    pub mutability: StateMutability,
}

impl FunctionSchema {
    /// Canonical signature, e.g. `walletInReg(address)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let args = self
            .inputs
            .iter()
            .map(|p| p.kind.canonical())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({args})", self.name)
    }

    /// Four-byte function selector.
    #[must_use]
    pub fn selector(&self) -> [u8; 4] {
        abi::selector(&self.signature())
    }

    /// Whether the function only reads state.
    #[must_use]
    pub fn is_view(&self) -> bool {
        self.mutability == StateMutability::View
    }
}

/// Schema for a contract constructor.
#[derive(Debug, Clone, Copy)]
pub struct ConstructorSchema {
    /// Constructor parameters.
    pub inputs: &'static [ParamSchema],
}

/// Complete schema for a contract.
#[derive(Debug, Clone, Copy)]
pub struct ContractSchema {
    /// Contract name.
    pub name: &'static str,
    /// Constructor description.
    pub constructor: ConstructorSchema,
    /// List of contract functions.
    pub functions: &'static [FunctionSchema],
}

impl ContractSchema {
    /// Returns an iterator over all functions.
    pub fn iter_functions(&self) -> impl Iterator<Item = &FunctionSchema> {
        self.functions.iter()
    }

    /// Find a function by name.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<&FunctionSchema> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Find a function by name.
    ///
    /// # Errors
    /// [`Error::UnknownFunction`] if the schema has no such function.
    pub fn function(&self, name: &str) -> Result<&FunctionSchema> {
        self.get_function(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    /// Find a function by its four-byte selector.
    #[must_use]
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&FunctionSchema> {
        self.functions.iter().find(|f| f.selector() == selector)
    }

    /// Standard Ethereum JSON ABI for this contract.
    #[must_use]
    pub fn to_abi_json(&self) -> serde_json::Value {
        let mut entries = vec![AbiEntry {
            inputs: abi_params(self.constructor.inputs),
            name: None,
            outputs: None,
            state_mutability: StateMutability::NonPayable.as_str(),
            kind: "constructor",
        }];

        entries.extend(self.functions.iter().map(|f| AbiEntry {
            inputs: abi_params(f.inputs),
            name: Some(f.name),
            outputs: Some(abi_params(f.outputs)),
            state_mutability: f.mutability.as_str(),
            kind: "function",
        }));

        serde_json::to_value(entries).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AbiEntry {
    inputs: Vec<AbiParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<AbiParam>>,
    state_mutability: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AbiParam {
    internal_type: &'static str,
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn abi_params(params: &[ParamSchema]) -> Vec<AbiParam> {
    params
        .iter()
        .map(|p| AbiParam {
            internal_type: p.kind.canonical(),
            name: p.name,
            kind: p.kind.canonical(),
        })
        .collect()
}

/// Function name: join the caller to the register.
pub const JOIN_WALLET_TO_REG: &str = "joinWalletToReg";
/// Function name: configured capacity.
pub const MAX_WALLET_FOR_REG: &str = "maxWalletForReg";
/// Function name: current registrant count.
pub const NUM_WALLET_IN_REG: &str = "numWalletInReg";
/// Function name: membership lookup.
pub const WALLET_IN_REG: &str = "walletInReg";

const UINT8_OUT: &[ParamSchema] = &[ParamSchema {
    name: "",
    kind: ParamType::Uint8,
}];

/// The register contract's interface.
pub const REGISTER: ContractSchema = ContractSchema {
    name: "Register",
    constructor: ConstructorSchema {
        inputs: &[ParamSchema {
            name: "_maxWalletForReg",
            kind: ParamType::Uint8,
        }],
    },
    functions: &[
        FunctionSchema {
            name: JOIN_WALLET_TO_REG,
            inputs: &[],
            outputs: &[],
            mutability: StateMutability::NonPayable,
        },
        FunctionSchema {
            name: MAX_WALLET_FOR_REG,
            inputs: &[],
            outputs: UINT8_OUT,
            mutability: StateMutability::View,
        },
        FunctionSchema {
            name: NUM_WALLET_IN_REG,
            inputs: &[],
            outputs: UINT8_OUT,
            mutability: StateMutability::View,
        },
        FunctionSchema {
            name: WALLET_IN_REG,
            inputs: &[ParamSchema {
                name: "",
                kind: ParamType::Address,
            }],
            outputs: &[ParamSchema {
                name: "",
                kind: ParamType::Bool,
            }],
            mutability: StateMutability::View,
        },
    ],
};

/// A contract schema bound to the address it is deployed at.
#[derive(Debug, Clone, Copy)]
pub struct ContractDescriptor {
    /// Deployment address.
    pub address: Address,
    /// Callable surface.
    pub schema: &'static ContractSchema,
}

impl ContractDescriptor {
    /// Describes a register contract deployed at `address`.
    #[must_use]
    pub fn register(address: Address) -> Self {
        Self {
            address,
            schema: &REGISTER,
        }
    }
}
