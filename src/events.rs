//! Structured on-chain events mirroring spec.md §6. CosmWasm has no
//! stdout logger; `Response::add_event`/`add_attribute` is the idiomatic
//! substitute the ecosystem uses for observability, so every
//! state-changing entry point emits one of these in addition to its flat
//! attributes.

use cosmwasm_std::Event;

use crate::primitives::{Hash32, Role};
use crate::state::{DstImmutablesComplement, Immutables};

pub fn escrow_created(address: &Hash32, immutables: &Immutables, role: Role, now: u64) -> Event {
    Event::new("escrow_created")
        .add_attribute("address", address.to_hex())
        .add_attribute("order_hash", immutables.order_hash.to_hex())
        .add_attribute("role", format!("{role:?}"))
        .add_attribute("timestamp", now.to_string())
}

pub fn src_escrow_created(
    address: &Hash32,
    immutables: &Immutables,
    dst_complement: &DstImmutablesComplement,
    now: u64,
) -> Event {
    Event::new("src_escrow_created")
        .add_attribute("address", address.to_hex())
        .add_attribute("order_hash", immutables.order_hash.to_hex())
        .add_attribute("maker_on_dst", dst_complement.maker_on_dst.to_string())
        .add_attribute("dst_amount", dst_complement.amount.to_string())
        .add_attribute("dst_token_id", dst_complement.token_id.0.clone())
        .add_attribute("dst_safety_deposit", dst_complement.safety_deposit.to_string())
        .add_attribute("dst_chain_id", dst_complement.dst_chain_id.clone())
        .add_attribute("timestamp", now.to_string())
}

pub fn dst_escrow_created(address: &Hash32, hashlock: &Hash32, taker: &str, now: u64) -> Event {
    Event::new("dst_escrow_created")
        .add_attribute("address", address.to_hex())
        .add_attribute("hashlock", hashlock.to_hex())
        .add_attribute("taker", taker.to_string())
        .add_attribute("timestamp", now.to_string())
}

pub fn withdrawn(address: &Hash32, secret_hex: &str, recipient: &str, amount: u64, now: u64) -> Event {
    Event::new("withdrawn")
        .add_attribute("address", address.to_hex())
        .add_attribute("secret", secret_hex.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("timestamp", now.to_string())
}

pub fn cancelled(address: &Hash32, recipient: &str, amount: u64, now: u64) -> Event {
    Event::new("cancelled")
        .add_attribute("address", address.to_hex())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("timestamp", now.to_string())
}

pub fn rescued(address: &Hash32, token_id: &str, amount: u64, recipient: &str, now: u64) -> Event {
    Event::new("rescued")
        .add_attribute("address", address.to_hex())
        .add_attribute("token_id", token_id.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("timestamp", now.to_string())
}

pub fn order_filled(
    order_hash: &Hash32,
    taker: &str,
    making: u128,
    taking: u128,
    rate_bump: u64,
    now: u64,
) -> Event {
    Event::new("order_filled")
        .add_attribute("order_hash", order_hash.to_hex())
        .add_attribute("taker", taker.to_string())
        .add_attribute("making", making.to_string())
        .add_attribute("taking", taking.to_string())
        .add_attribute("rate_bump", rate_bump.to_string())
        .add_attribute("timestamp", now.to_string())
}

pub fn secret_validated(
    order_hash: &Hash32,
    root_head_hex: &str,
    index: u64,
    secret_hash: &Hash32,
    now: u64,
) -> Event {
    Event::new("secret_validated")
        .add_attribute("order_hash", order_hash.to_hex())
        .add_attribute("root_head", root_head_hex.to_string())
        .add_attribute("index", index.to_string())
        .add_attribute("secret_hash", secret_hash.to_hex())
        .add_attribute("timestamp", now.to_string())
}
