use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::primitives::{Hash32, Role, TokenId};
use crate::state::{CreationStatus, DstImmutablesComplement, EscrowLifecycle, Immutables};

/// Seven stage offsets as they arrive over the wire, before
/// `Timelocks::new` validates their ordering and before `deployed_at` is
/// bound by the factory.
#[cw_serde]
pub struct TimelockOffsets {
    pub src_withdrawal: u32,
    pub src_public_withdrawal: u32,
    pub src_cancellation: u32,
    pub src_public_cancellation: u32,
    pub dst_withdrawal: u32,
    pub dst_public_withdrawal: u32,
    pub dst_cancellation: u32,
}

/// Merkle-proof data accompanying a multi-fill source-escrow creation.
/// `root` is the real 32-byte Merkle root the proof folds up to; it is
/// distinct from the order's packed `hashlock_info` field (see
/// `factory::MultiFillData`).
#[cw_serde]
pub struct MultiFillInfo {
    pub root: Hash32,
    pub proof: Vec<Hash32>,
    pub leaf_index: u64,
    pub secret_hash: Hash32,
    pub parts: u64,
    pub order_making_amount: u64,
    pub remaining_making_amount_before: u64,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub factory_id: String,
    pub src_rescue_delay: u64,
    pub dst_rescue_delay: u64,
    pub fee_bank: String,
    pub access_token: String,
    pub access_token_threshold: u64,
    pub resolver_fee: u64,
    pub whitelist_discount_numerator: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Advisory hook invoked before the order protocol matches a fill;
    /// records a pending creation request and emits an observer event. No
    /// escrow is created here (spec.md §4.7).
    PreInteraction {
        order_hash: Hash32,
        hashlock_info: Hash32,
        taker: String,
        making_amount: u64,
        taking_amount: u64,
        remaining_making_amount: u64,
    },
    /// Invoked by the order protocol on fill; creates the Source escrow
    /// (spec.md §4.6 `create_source`, §4.7 `post_interaction`).
    PostInteraction {
        order_hash: Hash32,
        hashlock_info: Hash32,
        maker: String,
        taker: String,
        token_id: String,
        making_amount: u64,
        taking_amount: u64,
        remaining_making_amount: u64,
        timelocks: TimelockOffsets,
        /// High 64 bits = src safety deposit, low 64 bits = dst safety
        /// deposit, matching the packed `deposits: u128` in spec.md §4.6.
        deposits: u128,
        dst_chain_id: String,
        dst_token_id: String,
        dst_amount: u64,
        multi_fill: Option<MultiFillInfo>,
        whitelist: Vec<String>,
        access_token_balance: u64,
    },
    CancelCreationRequest {
        order_hash: Hash32,
        hashlock: Hash32,
    },
    /// Resolver-funded Destination escrow creation (spec.md §4.6
    /// `create_destination`). Funds are attached via `info.funds`.
    CreateDestination {
        order_hash: Hash32,
        hashlock: Hash32,
        maker: String,
        taker: String,
        token_id: String,
        amount: u64,
        safety_deposit: u64,
        timelocks: TimelockOffsets,
        src_cancellation_timestamp: u64,
    },
    WithdrawSrc {
        address: String,
        secret: String,
    },
    CancelSrc {
        address: String,
    },
    PublicWithdrawSrc {
        address: String,
        secret: String,
    },
    PublicCancelSrc {
        address: String,
    },
    WithdrawDst {
        address: String,
        secret: String,
    },
    CancelDst {
        address: String,
    },
    PublicWithdrawDst {
        address: String,
        secret: String,
    },
    Rescue {
        address: String,
        token_id: String,
        amount: u64,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(EscrowResponse)]
    Escrow { address: String },
    #[returns(EscrowsResponse)]
    Escrows { start_after: Option<String>, limit: Option<u32> },
    #[returns(EscrowResponse)]
    EscrowByOrderHash { order_hash: Hash32 },
    #[returns(EscrowAddressResponse)]
    AddressOfEscrow {
        order_hash: Hash32,
        hashlock: Hash32,
        maker: String,
        taker: String,
        token_id: String,
        amount: u64,
        safety_deposit: u64,
        timelocks: TimelockOffsets,
        deployed_at: u32,
        role: Role,
    },
    #[returns(CreationRequestResponse)]
    CreationRequest { order_hash: Hash32, hashlock: Hash32 },
    #[returns(CreationRequestsResponse)]
    CreationRequests {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(MerkleIndexResponse)]
    MerkleIndexEntry { order_hash: Hash32, root: Hash32 },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub factory_id: String,
    pub src_rescue_delay: u64,
    pub dst_rescue_delay: u64,
    pub fee_bank: String,
    pub access_token: String,
    pub access_token_threshold: u64,
    pub resolver_fee: u64,
    pub whitelist_discount_numerator: u64,
    pub num_src_created: u64,
    pub num_dst_created: u64,
}

#[cw_serde]
pub struct EscrowResponse {
    pub address: String,
    pub role: Role,
    pub immutables: Immutables,
    pub dst_complement: Option<DstImmutablesComplement>,
    pub state: EscrowLifecycle,
    pub principal_balance: u64,
    pub deposit_balance: u64,
    pub created_at: u64,
}

#[cw_serde]
pub struct EscrowsResponse {
    pub escrows: Vec<EscrowResponse>,
}

#[cw_serde]
pub struct EscrowAddressResponse {
    pub address: String,
}

#[cw_serde]
pub struct CreationRequestResponse {
    pub order_hash: Hash32,
    pub hashlock: Hash32,
    pub status: CreationStatus,
    pub escrow_address: Option<String>,
    pub created_at: u64,
}

#[cw_serde]
pub struct CreationRequestsResponse {
    pub requests: Vec<CreationRequestResponse>,
}

#[cw_serde]
pub struct MerkleIndexResponse {
    pub next_expected_index: u64,
    pub last_validated_secret_hash: Option<Hash32>,
}

pub fn token_id_from_str(s: &str) -> TokenId {
    TokenId(s.to_string())
}
