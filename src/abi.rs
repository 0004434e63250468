// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Head-only ABI codec for the static types in [`ParamType`].
//!
//! Every supported type occupies exactly one 32-byte word, so a call is
//! `selector ++ word*` and a return value is `word*`.

use crate::{
    error::{Error, Result},
    primitives::{keccak256, Address},
    schema::{FunctionSchema, ParamSchema, ParamType},
};

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Selector of the standard `Error(string)` revert payload.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// A decoded ABI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uint8`
    Uint8(u8),
    /// `bool`
    Bool(bool),
}

impl Token {
    /// Type of this value.
    #[must_use]
    pub fn kind(&self) -> ParamType {
        match self {
            Self::Address(_) => ParamType::Address,
            Self::Uint8(_) => ParamType::Uint8,
            Self::Bool(_) => ParamType::Bool,
        }
    }

    fn to_word(self) -> [u8; WORD] {
        let mut word = [0u8; WORD];
        match self {
            Self::Address(address) => word[12..].copy_from_slice(address.as_bytes()),
            Self::Uint8(value) => word[31] = value,
            Self::Bool(value) => word[31] = u8::from(value),
        }
        word
    }

    fn from_word(kind: ParamType, word: &[u8]) -> Result<Self> {
        let (padding, tail) = match kind {
            ParamType::Address => word.split_at(12),
            ParamType::Uint8 | ParamType::Bool => word.split_at(31),
        };
        if padding.iter().any(|b| *b != 0) {
            return Err(Error::Abi(format!(
                "{} value has non-zero padding",
                kind.canonical()
            )));
        }

        match kind {
            ParamType::Address => Ok(Self::Address(Address::from_slice(tail)?)),
            ParamType::Uint8 => Ok(Self::Uint8(tail[0])),
            ParamType::Bool => match tail[0] {
                0 => Ok(Self::Bool(false)),
                1 => Ok(Self::Bool(true)),
                other => Err(Error::Abi(format!("invalid bool word value {other}"))),
            },
        }
    }

    /// The value as `uint8`.
    ///
    /// # Errors
    /// Fails if the token holds another type.
    pub fn into_uint8(self) -> Result<u8> {
        match self {
            Self::Uint8(value) => Ok(value),
            other => Err(unexpected(ParamType::Uint8, other)),
        }
    }

    /// The value as `bool`.
    ///
    /// # Errors
    /// Fails if the token holds another type.
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(value),
            other => Err(unexpected(ParamType::Bool, other)),
        }
    }

    /// The value as `address`.
    ///
    /// # Errors
    /// Fails if the token holds another type.
    pub fn into_address(self) -> Result<Address> {
        match self {
            Self::Address(value) => Ok(value),
            other => Err(unexpected(ParamType::Address, other)),
        }
    }
}

fn unexpected(expected: ParamType, got: Token) -> Error {
    Error::Abi(format!(
        "expected {}, got {}",
        expected.canonical(),
        got.kind().canonical()
    ))
}

/// Four-byte selector of a canonical function signature.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes `args` against `params`.
///
/// # Errors
/// Fails on an arity or type mismatch.
pub fn encode_args(params: &[ParamSchema], args: &[Token]) -> Result<Vec<u8>> {
    if params.len() != args.len() {
        return Err(Error::Abi(format!(
            "expected {} arguments, got {}",
            params.len(),
            args.len()
        )));
    }

    let mut out = Vec::with_capacity(args.len() * WORD);
    for (param, arg) in params.iter().zip(args) {
        if param.kind != arg.kind() {
            return Err(unexpected(param.kind, *arg));
        }
        out.extend_from_slice(&arg.to_word());
    }
    Ok(out)
}

/// Encodes a full call: selector followed by the arguments.
///
/// # Errors
/// See [`encode_args`].
pub fn encode_call(function: &FunctionSchema, args: &[Token]) -> Result<Vec<u8>> {
    let mut data = function.selector().to_vec();
    data.extend(encode_args(function.inputs, args)?);
    Ok(data)
}

/// Decodes words against `params`.
///
/// # Errors
/// Fails on short data, dirty padding or an invalid `bool` word.
pub fn decode(params: &[ParamSchema], data: &[u8]) -> Result<Vec<Token>> {
    if data.len() < params.len() * WORD {
        return Err(Error::Abi(format!(
            "expected at least {} bytes of return data, got {}",
            params.len() * WORD,
            data.len()
        )));
    }

    params
        .iter()
        .zip(data.chunks(WORD))
        .map(|(param, word)| Token::from_word(param.kind, word))
        .collect()
}

/// Splits calldata into its selector and argument words.
///
/// # Errors
/// Fails if `data` is shorter than a selector.
pub fn split_call(data: &[u8]) -> Result<([u8; 4], &[u8])> {
    if data.len() < 4 {
        return Err(Error::Abi("calldata shorter than a selector".to_string()));
    }
    let (head, rest) = data.split_at(4);
    Ok(([head[0], head[1], head[2], head[3]], rest))
}

/// Encodes a revert payload as `Error(string)`.
#[must_use]
pub fn encode_revert(reason: &str) -> Vec<u8> {
    let bytes = reason.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;

    let mut out = ERROR_STRING_SELECTOR.to_vec();
    out.extend_from_slice(&usize_word(WORD));
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(4 + 2 * WORD + padded, 0);
    out
}

/// Decodes the reason string from an `Error(string)` revert payload.
///
/// Returns `None` for empty or custom-error payloads.
#[must_use]
pub fn decode_revert(data: &[u8]) -> Option<String> {
    let (selector, body) = split_call(data).ok()?;
    if selector != ERROR_STRING_SELECTOR || body.len() < 2 * WORD {
        return None;
    }

    let offset = word_to_usize(&body[..WORD])?;
    let start = offset.checked_add(WORD)?;
    let len = word_to_usize(body.get(offset..start)?)?;
    let raw = body.get(start..start.checked_add(len)?)?;
    String::from_utf8(raw.to_vec()).ok()
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    let value = u64::try_from(value).unwrap_or(u64::MAX);
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_to_usize(word: &[u8]) -> Option<usize> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(raw)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{REGISTER, WALLET_IN_REG};

    #[test]
    fn selectors_match_known_erc20_values() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn encodes_membership_call() {
        let function = REGISTER.function(WALLET_IN_REG).expect("present");
        let address = Address::new([0x11; 20]);

        let data = encode_call(function, &[Token::Address(address)]).expect("encodes");
        assert_eq!(data.len(), 4 + WORD);
        assert_eq!(&data[..4], &function.selector());
        assert!(data[4..16].iter().all(|b| *b == 0));
        assert_eq!(&data[16..], address.as_bytes());
    }

    #[test]
    fn rejects_argument_type_mismatch() {
        let function = REGISTER.function(WALLET_IN_REG).expect("present");
        let err = encode_call(function, &[Token::Bool(true)]).expect_err("wrong type");
        assert!(err.to_string().contains("expected address"));
    }

    #[test]
    fn decodes_bool_and_rejects_dirty_words() {
        let function = REGISTER.function(WALLET_IN_REG).expect("present");

        let mut word = [0u8; WORD];
        word[31] = 1;
        let tokens = decode(function.outputs, &word).expect("decodes");
        assert_eq!(tokens, vec![Token::Bool(true)]);

        word[31] = 2;
        assert!(decode(function.outputs, &word).is_err());

        word[31] = 1;
        word[0] = 1;
        assert!(decode(function.outputs, &word).is_err());
    }

    #[test]
    fn short_return_data_is_an_error() {
        let function = REGISTER.function(WALLET_IN_REG).expect("present");
        assert!(decode(function.outputs, &[0u8; 8]).is_err());
    }

    #[test]
    fn revert_reason_survives_encoding() {
        let payload = encode_revert("Register is full");
        assert_eq!(payload.len(), 4 + 3 * WORD);
        assert_eq!(decode_revert(&payload).as_deref(), Some("Register is full"));
    }

    #[test]
    fn custom_error_payload_has_no_reason() {
        assert_eq!(decode_revert(&[0xde, 0xad, 0xbe, 0xef]), None);
        assert_eq!(decode_revert(&[]), None);
    }

    fn revert_payload(words: &[u64]) -> Vec<u8> {
        let mut payload = ERROR_STRING_SELECTOR.to_vec();
        for value in words {
            let mut word = [0u8; WORD];
            word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
            payload.extend_from_slice(&word);
        }
        payload
    }

    #[test]
    fn huge_revert_offset_has_no_reason() {
        assert_eq!(decode_revert(&revert_payload(&[u64::MAX, 0])), None);
    }

    #[test]
    fn huge_revert_length_has_no_reason() {
        assert_eq!(decode_revert(&revert_payload(&[32, u64::MAX - 10, 0])), None);
    }

    #[test]
    fn revert_length_past_the_payload_has_no_reason() {
        assert_eq!(decode_revert(&revert_payload(&[32, 64, 0])), None);
    }
}
