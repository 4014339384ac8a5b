use cosmwasm_std::StdError;
use thiserror::Error;

/// Error kinds surfaced to callers, one per Error Kind in spec.md §7.
#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] cw_utils::PaymentError),

    #[error("invalid timelock: {reason}")]
    InvalidTimelock { reason: String },

    #[error("invalid secret")]
    InvalidSecret {},

    #[error("invalid secret index: {reason}")]
    InvalidSecretIndex { reason: String },

    #[error("immutables mismatch: {reason}")]
    ImmutablesMismatch { reason: String },

    #[error("action not permitted in current stage window: {reason}")]
    StageWindow { reason: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("escrow already settled")]
    AlreadySettled {},

    #[error("insufficient balance: {reason}")]
    InsufficientBalance { reason: String },

    #[error("not found: {reason}")]
    NotFound { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}
