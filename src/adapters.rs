//! AuctionAdapter / FeeAdapter — pure-function collaborators consulted for
//! amount adjustment and resolver admission (spec.md §4.8). The core only
//! depends on these traits; concrete pricing/whitelist policy lives outside
//! this crate's scope (§1 "out of scope").

use cosmwasm_std::Addr;
use serde::{Deserialize, Serialize};

use crate::error::ContractError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AuctionConfig {
    pub start_time: u64,
    pub duration: u64,
    pub initial_rate_bump: u64,
    pub points: Vec<(u64, u64)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FeeConfig {
    pub resolver_fee: u64,
    pub whitelist_discount_numerator: u64,
}

pub enum AccessVerdict {
    Ok,
    Charge(u64),
}

/// `ceil(n / d)`, per the Glossary's rate-bump formula note.
pub fn ceil_div(n: u128, d: u128) -> u128 {
    (n + d - 1) / d
}

pub trait AuctionAdapter {
    /// Monotonic-ish Dutch decay with gas-price compensation.
    fn rate_bump(&self, config: &AuctionConfig, gas_price_signal: u64, now: u64) -> u64;
}

pub trait FeeAdapter {
    fn validate_resolver_access(
        &self,
        whitelist: &[Addr],
        resolver: &Addr,
        now: u64,
        access_token_balance: u64,
        fee_config: &FeeConfig,
    ) -> Result<AccessVerdict, ContractError>;
}

/// `amount_making = floor(order_making * taking / (order_taking * rate_bump_base) ...)`
/// Rather than encode one specific auction curve's arithmetic (that curve
/// belongs to the external pricing module), this engine exposes the two
/// rounding directions the spec names: making floors, taking ceils.
pub fn adjusted_making(order_making: u128, order_taking: u128, taking: u128, rate_bump: u64) -> u128 {
    let base = 10_000u128;
    let adjusted_taking = taking * base / (base + rate_bump as u128);
    (order_making * adjusted_taking) / order_taking
}

pub fn adjusted_taking(order_making: u128, order_taking: u128, making: u128, rate_bump: u64) -> u128 {
    let base = 10_000u128;
    let raw = ceil_div(order_taking * making, order_making);
    ceil_div(raw * (base + rate_bump as u128), base)
}

/// Reference linear-decay implementation, grounded in the piecewise-linear
/// auction curves the retrieval pack's Stellar/NEAR siblings implement
/// recursively; this one folds iteratively (either form is acceptable per
/// spec.md §9 "Recursive helpers").
pub struct LinearDecayAuctionAdapter;

impl AuctionAdapter for LinearDecayAuctionAdapter {
    fn rate_bump(&self, config: &AuctionConfig, gas_price_signal: u64, now: u64) -> u64 {
        if now <= config.start_time {
            return config.initial_rate_bump + gas_price_signal;
        }
        let elapsed = now - config.start_time;
        if elapsed >= config.duration {
            return gas_price_signal;
        }
        let mut bump = config.initial_rate_bump;
        for (point_time, point_bump) in &config.points {
            if elapsed >= *point_time {
                bump = *point_bump;
            } else {
                break;
            }
        }
        bump + gas_price_signal
    }
}

/// Reference whitelist/access-token admission check.
pub struct ThresholdFeeAdapter {
    pub access_token_threshold: u64,
}

impl FeeAdapter for ThresholdFeeAdapter {
    fn validate_resolver_access(
        &self,
        whitelist: &[Addr],
        resolver: &Addr,
        _now: u64,
        access_token_balance: u64,
        fee_config: &FeeConfig,
    ) -> Result<AccessVerdict, ContractError> {
        if whitelist.iter().any(|w| w == resolver) {
            return Ok(AccessVerdict::Ok);
        }
        if access_token_balance >= self.access_token_threshold {
            return Ok(AccessVerdict::Ok);
        }
        if fee_config.resolver_fee > 0 {
            return Ok(AccessVerdict::Charge(fee_config.resolver_fee));
        }
        Err(ContractError::Unauthorized {
            reason: "resolver not whitelisted and lacks access token balance".into(),
        })
    }
}
