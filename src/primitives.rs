//! Small content-addressed value types shared across every module.
//!
//! [`Design notes §9`]: each record carries an explicit `token_id` rather
//! than relying on a generic/phantom type parameter, so that cross-component
//! comparisons (factory vs. escrow vs. query layer) dispatch on a runtime
//! value instead of a compile-time type.

use std::fmt;

use cosmwasm_std::StdError;
use serde::{Deserialize, Serialize};

/// A 32-byte content hash (order identity, hashlock, secret hash, derived
/// address). Serialized as lowercase hex so it round-trips through JSON
/// messages and storage keys unchanged.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, schemars::JsonSchema)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, StdError> {
        if bytes.len() != 32 {
            return Err(StdError::generic_err(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(Hash32(out))
    }

    pub fn from_hex(s: &str) -> Result<Self, StdError> {
        let bytes = hex::decode(s).map_err(|e| StdError::generic_err(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Top 30 bytes — the "root head" used as the compact Merkle-root key.
    pub fn root_head(&self) -> [u8; 30] {
        let mut out = [0u8; 30];
        out.copy_from_slice(&self.0[0..30]);
        out
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash32 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Hash32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifies a fungible-asset class: either the chain's native denom
/// (`native:uatom`) or a cw20 contract address (`cw20:<addr>`). Plain
/// string equality stands in for the compile-time `TokenType` generic of
/// the capability-based source this engine generalizes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn native(denom: impl Into<String>) -> Self {
        TokenId(format!("native:{}", denom.into()))
    }

    pub fn cw20(addr: impl Into<String>) -> Self {
        TokenId(format!("cw20:{}", addr.into()))
    }

    pub fn as_native_denom(&self) -> Option<&str> {
        self.0.strip_prefix("native:")
    }

    pub fn as_cw20_addr(&self) -> Option<&str> {
        self.0.strip_prefix("cw20:")
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Which side of the swap an escrow custodies: the maker-funded Source
/// chain or the resolver-funded Destination chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub enum Role {
    Source,
    Destination,
}

impl Role {
    pub fn role_byte(self) -> u8 {
        match self {
            Role::Source => 0,
            Role::Destination => 1,
        }
    }
}
