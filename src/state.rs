//! Data model: Immutables (content-addressed escrow parameters),
//! EscrowRecord (the custody container's persisted state), and the
//! process-wide FactoryState singleton (spec.md §3).

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

use crate::primitives::{Hash32, Role, TokenId};
use crate::timelocks::Timelocks;

/// Frozen per-escrow parameter set. Content-hash (`address::immutables_hash`)
/// determines the escrow address; any mismatch between stored and
/// caller-supplied Immutables fails every state transition.
#[cw_serde]
pub struct Immutables {
    pub order_hash: Hash32,
    pub hashlock: Hash32,
    pub maker: Addr,
    pub taker: Addr,
    pub token_id: TokenId,
    pub amount: u64,
    pub safety_deposit: u64,
    pub timelocks: Timelocks,
}

impl Immutables {
    /// Length-prefixed canonical encoding used for content hashing
    /// (spec.md §6): fixed-width fields are concatenated directly,
    /// variable-width fields (addresses, token id) are prefixed with a
    /// little-endian u32 length so the encoding is unambiguous.
    pub fn canonical_encoding(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.order_hash.as_bytes());
        out.extend_from_slice(self.hashlock.as_bytes());
        push_length_prefixed(&mut out, self.maker.as_str().as_bytes());
        push_length_prefixed(&mut out, self.taker.as_str().as_bytes());
        push_length_prefixed(&mut out, self.token_id.as_bytes());
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.safety_deposit.to_le_bytes());
        out.extend_from_slice(&self.timelocks.to_bytes());
        out
    }
}

fn push_length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Cross-chain complement carried alongside a Source escrow so observers
/// can reconstruct the matching Destination escrow's parameters.
#[cw_serde]
pub struct DstImmutablesComplement {
    pub maker_on_dst: Addr,
    pub amount: u64,
    pub token_id: TokenId,
    pub safety_deposit: u64,
    pub dst_chain_id: String,
}

#[cw_serde]
pub enum EscrowLifecycle {
    Active,
    Withdrawn { secret_hex: String },
    Cancelled,
}

/// The custody container: immutable parameters plus the mutable lifecycle
/// and balances. Balances are drained to zero on the terminal transition;
/// no partial balances are ever surfaced (spec.md §4.5).
#[cw_serde]
pub struct EscrowRecord {
    pub role: Role,
    pub immutables: Immutables,
    pub dst_complement: Option<DstImmutablesComplement>,
    pub state: EscrowLifecycle,
    pub principal_balance: u64,
    pub deposit_balance: u64,
    pub created_at: u64,
}

impl EscrowRecord {
    pub fn is_active(&self) -> bool {
        matches!(self.state, EscrowLifecycle::Active)
    }
}

/// Per-factory-identity configuration, set once at `initialize`.
#[cw_serde]
pub struct FactoryState {
    pub owner: Addr,
    pub factory_id: String,
    pub src_rescue_delay: u64,
    pub dst_rescue_delay: u64,
    pub fee_bank: Addr,
    pub access_token: Addr,
    pub access_token_threshold: u64,
    pub resolver_fee: u64,
    pub whitelist_discount_numerator: u64,
    pub num_src_created: u64,
    pub num_dst_created: u64,
}

#[cw_serde]
pub enum CreationStatus {
    Pending,
    Created,
    Cancelled,
}

/// Bookkeeping row recorded before an escrow is materialized, keyed by
/// `(order_hash, hashlock)`. Not itself a spec.md module, but a natural
/// home for `pre_interaction`'s advisory event and for idempotent replay
/// protection on `post_interaction`.
#[cw_serde]
pub struct EscrowCreationRequest {
    pub order_hash: Hash32,
    pub hashlock: Hash32,
    pub status: CreationStatus,
    pub escrow_address: Option<Hash32>,
    pub created_at: u64,
}

pub const FACTORY_STATE: Item<FactoryState> = Item::new("factory_state");

/// Keyed by the hex-encoded derived escrow address.
pub const ESCROWS: Map<String, EscrowRecord> = Map::new("escrows");

/// Secondary index: order_hash (hex) -> derived escrow address (hex), for
/// the source escrow created on behalf of that order.
pub const ESCROW_BY_ORDER_HASH: Map<String, String> = Map::new("escrow_by_order_hash");

pub const CREATION_REQUESTS: Map<(String, String), EscrowCreationRequest> =
    Map::new("creation_requests");

pub fn creation_request_key(order_hash: &Hash32, hashlock: &Hash32) -> (String, String) {
    (order_hash.to_hex(), hashlock.to_hex())
}
