//! FactoryRegistry — the per-chain entry point that turns an order fill
//! into a deterministically-addressed escrow (spec.md §4.6), plus the
//! OrderInteraction hooks that bracket a fill (§4.7).

use cosmwasm_std::{Addr, Storage};

use crate::address;
use crate::adapters::{AccessVerdict, FeeAdapter, FeeConfig, ThresholdFeeAdapter};
use crate::error::ContractError;
use crate::hashlock;
use crate::merkle_index;
use crate::primitives::{Hash32, Role, TokenId};
use crate::state::{
    creation_request_key, CreationStatus, DstImmutablesComplement, EscrowCreationRequest,
    EscrowLifecycle, EscrowRecord, FactoryState, Immutables, CREATION_REQUESTS, ESCROWS,
    ESCROW_BY_ORDER_HASH, FACTORY_STATE,
};
use crate::timelocks::Timelocks;

#[allow(clippy::too_many_arguments)]
pub fn initialize(
    storage: &mut dyn Storage,
    owner: Addr,
    factory_id: String,
    src_rescue_delay: u64,
    dst_rescue_delay: u64,
    fee_bank: Addr,
    access_token: Addr,
    access_token_threshold: u64,
    resolver_fee: u64,
    whitelist_discount_numerator: u64,
) -> Result<(), ContractError> {
    FACTORY_STATE.save(
        storage,
        &FactoryState {
            owner,
            factory_id,
            src_rescue_delay,
            dst_rescue_delay,
            fee_bank,
            access_token,
            access_token_threshold,
            resolver_fee,
            whitelist_discount_numerator,
            num_src_created: 0,
            num_dst_created: 0,
        },
    )?;
    Ok(())
}

/// Merkle-proof data accompanying a multi-fill source-escrow creation,
/// already resolved into `Addr`/numeric form by `execute.rs`.
///
/// `root` is the genuine 32-byte Merkle root the proof folds up to. It is
/// kept separate from `hashlock_info` (the packed 30-byte root-head plus
/// 8-byte parts-count stored in Immutables) because that packed encoding
/// overlaps its own root-head and parts-count bytes and cannot reproduce
/// the full root spec.md §4.3's `verify_merkle` checks against.
pub struct MultiFillData {
    pub root: Hash32,
    pub proof: Vec<Hash32>,
    pub leaf_index: u64,
    pub secret_hash: Hash32,
    pub parts: u64,
    pub order_making_amount: u128,
    pub remaining_making_amount_before: u128,
}

pub struct SourceCreationInput {
    pub order_hash: Hash32,
    pub hashlock_info: Hash32,
    pub maker: Addr,
    pub taker: Addr,
    pub token_id: TokenId,
    pub making_amount: u64,
    pub remaining_making_amount: u64,
    pub timelocks: Timelocks,
    pub src_safety_deposit: u64,
    pub dst_safety_deposit: u64,
    pub dst_maker: Addr,
    pub dst_chain_id: String,
    pub dst_token_id: TokenId,
    pub dst_amount: u64,
    pub multi_fill: Option<MultiFillData>,
    pub whitelist: Vec<Addr>,
    pub access_token_balance: u64,
}

pub struct SourceCreationOutcome {
    pub address: Hash32,
    pub immutables: Immutables,
    pub dst_complement: DstImmutablesComplement,
    pub fee_charge: Option<u64>,
    pub secret_validated: Option<SecretValidatedInfo>,
}

/// Emitted alongside `SrcEscrowCreated` whenever this fill validated a
/// Merkle-indexed secret (spec.md §6 `SecretValidated`); `None` for
/// single-fill orders, which never touch `MerkleIndex`.
pub struct SecretValidatedInfo {
    pub order_hash: Hash32,
    pub root_head_hex: String,
    pub index: u64,
    pub secret_hash: Hash32,
}

/// Resolves `hashlock_info` into the effective per-escrow hashlock. For a
/// single-fill order it passes through unchanged; for a multi-fill order
/// `hashlock_info` is the Merkle root and the effective hashlock is the
/// validated leaf's secret hash (spec.md §4.6 step 2). See DESIGN.md for
/// the reasoning behind treating `hashlock_info` as the bare 32-byte root.
fn resolve_effective_hashlock(
    storage: &mut dyn Storage,
    order_hash: &Hash32,
    hashlock_info: &Hash32,
    this_fill: u128,
    multi_fill: &Option<MultiFillData>,
) -> Result<Hash32, ContractError> {
    match multi_fill {
        None => Ok(*hashlock_info),
        Some(mf) => {
            let parts_amount = hashlock::extract_parts_amount(hashlock_info);
            if parts_amount != mf.parts {
                return Err(ContractError::InvalidConfiguration {
                    reason: "parts_amount encoded in hashlock_info does not match proof parts".into(),
                });
            }
            if hashlock_info.root_head() != mf.root.root_head() {
                return Err(ContractError::ImmutablesMismatch {
                    reason: "hashlock_info's root head does not match the supplied Merkle root".into(),
                });
            }
            hashlock::validate_merkle_config(&mf.root, mf.parts)?;
            merkle_index::validate_and_record(
                storage,
                order_hash,
                &mf.root,
                &mf.proof,
                mf.leaf_index,
                &mf.secret_hash,
                mf.order_making_amount,
                mf.remaining_making_amount_before,
                this_fill,
                mf.parts,
            )?;
            Ok(mf.secret_hash)
        }
    }
}

fn check_resolver_access(
    factory: &FactoryState,
    input: &SourceCreationInput,
    now: u64,
) -> Result<Option<u64>, ContractError> {
    let fee_config = FeeConfig {
        resolver_fee: factory.resolver_fee,
        whitelist_discount_numerator: factory.whitelist_discount_numerator,
    };
    let adapter = ThresholdFeeAdapter {
        access_token_threshold: factory.access_token_threshold,
    };
    match adapter.validate_resolver_access(
        &input.whitelist,
        &input.taker,
        now,
        input.access_token_balance,
        &fee_config,
    )? {
        AccessVerdict::Ok => Ok(None),
        AccessVerdict::Charge(amount) => Ok(Some(amount)),
    }
}

/// `create_source` (spec.md §4.6). Resolves the effective hashlock,
/// checks resolver admission, derives the deterministic address, and
/// materializes the escrow record. Does not move funds — that is
/// `execute.rs`'s responsibility once it has a `CosmosMsg` vocabulary.
pub fn create_source(
    storage: &mut dyn Storage,
    now: u64,
    mut input: SourceCreationInput,
) -> Result<SourceCreationOutcome, ContractError> {
    let mut factory = FACTORY_STATE.load(storage)?;

    let fee_charge = check_resolver_access(&factory, &input, now)?;

    let this_fill = input.making_amount as u128;
    let effective_hashlock = resolve_effective_hashlock(
        storage,
        &input.order_hash,
        &input.hashlock_info,
        this_fill,
        &input.multi_fill,
    )?;
    let secret_validated = input.multi_fill.as_ref().map(|mf| SecretValidatedInfo {
        order_hash: input.order_hash,
        root_head_hex: hex::encode(mf.root.root_head()),
        index: mf.leaf_index,
        secret_hash: mf.secret_hash,
    });

    input.timelocks.bind(now as u32);
    let immutables = Immutables {
        order_hash: input.order_hash,
        hashlock: effective_hashlock,
        maker: input.maker.clone(),
        taker: input.taker.clone(),
        token_id: input.token_id.clone(),
        amount: input.making_amount,
        safety_deposit: input.src_safety_deposit,
        timelocks: input.timelocks,
    };

    let address = address::derive(&factory.factory_id, &immutables, Role::Source);
    let address_hex = address.to_hex();

    if ESCROWS.has(storage, address_hex.clone()) {
        return Err(ContractError::InvalidConfiguration {
            reason: "an escrow already exists at this derived address".into(),
        });
    }

    let dst_complement = DstImmutablesComplement {
        maker_on_dst: input.dst_maker,
        amount: input.dst_amount,
        token_id: input.dst_token_id,
        safety_deposit: input.dst_safety_deposit,
        dst_chain_id: input.dst_chain_id,
    };

    let record = EscrowRecord {
        role: Role::Source,
        immutables: immutables.clone(),
        dst_complement: Some(dst_complement.clone()),
        state: EscrowLifecycle::Active,
        principal_balance: input.making_amount,
        deposit_balance: input.src_safety_deposit,
        created_at: now,
    };
    ESCROWS.save(storage, address_hex.clone(), &record)?;
    ESCROW_BY_ORDER_HASH.save(storage, immutables.order_hash.to_hex(), &address_hex)?;

    factory.num_src_created += 1;
    FACTORY_STATE.save(storage, &factory)?;

    upsert_creation_request(storage, &immutables.order_hash, &immutables.hashlock, now, Some(address))?;

    Ok(SourceCreationOutcome {
        address,
        immutables,
        dst_complement,
        fee_charge,
        secret_validated,
    })
}

pub struct DestinationCreationInput {
    pub order_hash: Hash32,
    pub hashlock: Hash32,
    pub maker: Addr,
    pub taker: Addr,
    pub token_id: TokenId,
    pub amount: u64,
    pub safety_deposit: u64,
    pub timelocks: Timelocks,
    pub src_cancellation_timestamp: u64,
}

pub struct DestinationCreationOutcome {
    pub address: Hash32,
    pub immutables: Immutables,
}

/// `create_destination` (spec.md §4.6). Enforces Scenario D's invariant:
/// the destination cancellation stage must land no later than the
/// matching source escrow's cancellation timestamp, or a resolver could
/// strand the maker's funds past the point the source side becomes
/// publicly cancellable.
pub fn create_destination(
    storage: &mut dyn Storage,
    now: u64,
    mut input: DestinationCreationInput,
) -> Result<DestinationCreationOutcome, ContractError> {
    let mut factory = FACTORY_STATE.load(storage)?;

    input.timelocks.bind(now as u32);
    let dst_cancellation_time = input
        .timelocks
        .stage_time(crate::timelocks::Stage::DstCancellation)?;
    if dst_cancellation_time > input.src_cancellation_timestamp {
        return Err(ContractError::InvalidTimelock {
            reason: "destination cancellation stage exceeds the source escrow's cancellation timestamp".into(),
        });
    }

    let immutables = Immutables {
        order_hash: input.order_hash,
        hashlock: input.hashlock,
        maker: input.maker,
        taker: input.taker,
        token_id: input.token_id,
        amount: input.amount,
        safety_deposit: input.safety_deposit,
        timelocks: input.timelocks,
    };

    let address = address::derive(&factory.factory_id, &immutables, Role::Destination);
    let address_hex = address.to_hex();
    if ESCROWS.has(storage, address_hex.clone()) {
        return Err(ContractError::InvalidConfiguration {
            reason: "an escrow already exists at this derived address".into(),
        });
    }

    let record = EscrowRecord {
        role: Role::Destination,
        immutables: immutables.clone(),
        dst_complement: None,
        state: EscrowLifecycle::Active,
        principal_balance: input.amount,
        deposit_balance: input.safety_deposit,
        created_at: now,
    };
    ESCROWS.save(storage, address_hex, &record)?;

    factory.num_dst_created += 1;
    FACTORY_STATE.save(storage, &factory)?;

    Ok(DestinationCreationOutcome { address, immutables })
}

/// `pre_interaction` (spec.md §4.7) — advisory hook; records a Pending
/// creation request so `post_interaction`/`create_source` can be
/// correlated and so observers watching `CREATION_REQUESTS` see intent
/// before the escrow materializes.
pub fn pre_interaction(
    storage: &mut dyn Storage,
    order_hash: &Hash32,
    hashlock: &Hash32,
    now: u64,
) -> Result<(), ContractError> {
    upsert_creation_request(storage, order_hash, hashlock, now, None)
}

fn upsert_creation_request(
    storage: &mut dyn Storage,
    order_hash: &Hash32,
    hashlock: &Hash32,
    now: u64,
    escrow_address: Option<Hash32>,
) -> Result<(), ContractError> {
    let key = creation_request_key(order_hash, hashlock);
    let status = if escrow_address.is_some() {
        CreationStatus::Created
    } else {
        CreationStatus::Pending
    };
    let created_at = CREATION_REQUESTS
        .may_load(storage, key.clone())?
        .map(|r| r.created_at)
        .unwrap_or(now);
    CREATION_REQUESTS.save(
        storage,
        key,
        &EscrowCreationRequest {
            order_hash: *order_hash,
            hashlock: *hashlock,
            status,
            escrow_address,
            created_at,
        },
    )?;
    Ok(())
}

pub fn cancel_creation_request(
    storage: &mut dyn Storage,
    order_hash: &Hash32,
    hashlock: &Hash32,
) -> Result<(), ContractError> {
    let key = creation_request_key(order_hash, hashlock);
    let mut request = CREATION_REQUESTS
        .may_load(storage, key.clone())?
        .ok_or(ContractError::NotFound {
            reason: "no creation request for this order_hash/hashlock pair".into(),
        })?;
    if !matches!(request.status, CreationStatus::Pending) {
        return Err(ContractError::InvalidConfiguration {
            reason: "only a pending creation request can be cancelled".into(),
        });
    }
    request.status = CreationStatus::Cancelled;
    CREATION_REQUESTS.save(storage, key, &request)?;
    Ok(())
}
