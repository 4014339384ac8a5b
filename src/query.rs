//! Read-only query handlers: escrow lookups, factory configuration, and
//! the pure-derivation `AddressOfEscrow` preview (spec.md §4.2/§4.6).

use cosmwasm_std::{Addr, Deps, Order, StdResult};
use cw_storage_plus::Bound;

use crate::address;
use crate::msg::{
    ConfigResponse, CreationRequestResponse, CreationRequestsResponse, EscrowAddressResponse,
    EscrowResponse, EscrowsResponse, MerkleIndexResponse, TimelockOffsets,
};
use crate::merkle_index::{self, MERKLE_INDEX};
use crate::primitives::{Hash32, Role, TokenId};
use crate::state::{
    EscrowRecord, Immutables, CREATION_REQUESTS, ESCROWS, ESCROW_BY_ORDER_HASH, FACTORY_STATE,
};
use crate::timelocks::Timelocks;

fn to_response(address: &str, record: EscrowRecord) -> EscrowResponse {
    EscrowResponse {
        address: address.to_string(),
        role: record.role,
        immutables: record.immutables,
        dst_complement: record.dst_complement,
        state: record.state,
        principal_balance: record.principal_balance,
        deposit_balance: record.deposit_balance,
        created_at: record.created_at,
    }
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let factory = FACTORY_STATE.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: factory.owner.to_string(),
        factory_id: factory.factory_id,
        src_rescue_delay: factory.src_rescue_delay,
        dst_rescue_delay: factory.dst_rescue_delay,
        fee_bank: factory.fee_bank.to_string(),
        access_token: factory.access_token.to_string(),
        access_token_threshold: factory.access_token_threshold,
        resolver_fee: factory.resolver_fee,
        whitelist_discount_numerator: factory.whitelist_discount_numerator,
        num_src_created: factory.num_src_created,
        num_dst_created: factory.num_dst_created,
    })
}

pub fn query_escrow(deps: Deps, address: String) -> StdResult<EscrowResponse> {
    let record = ESCROWS.load(deps.storage, address.clone())?;
    Ok(to_response(&address, record))
}

pub fn query_escrow_by_order_hash(deps: Deps, order_hash: Hash32) -> StdResult<EscrowResponse> {
    let address = ESCROW_BY_ORDER_HASH.load(deps.storage, order_hash.to_hex())?;
    let record = ESCROWS.load(deps.storage, address.clone())?;
    Ok(to_response(&address, record))
}

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

pub fn query_escrows(deps: Deps, start_after: Option<String>, limit: Option<u32>) -> StdResult<EscrowsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let escrows = ESCROWS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (address, record) = item?;
            Ok(to_response(&address, record))
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(EscrowsResponse { escrows })
}

#[allow(clippy::too_many_arguments)]
pub fn query_address_of_escrow(
    deps: Deps,
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
) -> StdResult<EscrowAddressResponse> {
    let factory = FACTORY_STATE.load(deps.storage)?;
    let mut tl = Timelocks::new(
        timelocks.src_withdrawal,
        timelocks.src_public_withdrawal,
        timelocks.src_cancellation,
        timelocks.src_public_cancellation,
        timelocks.dst_withdrawal,
        timelocks.dst_public_withdrawal,
        timelocks.dst_cancellation,
    )
    .map_err(|e| cosmwasm_std::StdError::generic_err(e.to_string()))?;
    tl.bind(deployed_at);

    let immutables = Immutables {
        order_hash,
        hashlock,
        maker: Addr::unchecked(maker),
        taker: Addr::unchecked(taker),
        token_id: TokenId(token_id),
        amount,
        safety_deposit,
        timelocks: tl,
    };
    let address = address::derive(&factory.factory_id, &immutables, role);
    Ok(EscrowAddressResponse {
        address: address.to_hex(),
    })
}

fn request_to_response(request: crate::state::EscrowCreationRequest) -> CreationRequestResponse {
    CreationRequestResponse {
        order_hash: request.order_hash,
        hashlock: request.hashlock,
        status: request.status,
        escrow_address: request.escrow_address.map(|a| a.to_hex()),
        created_at: request.created_at,
    }
}

pub fn query_creation_request(deps: Deps, order_hash: Hash32, hashlock: Hash32) -> StdResult<CreationRequestResponse> {
    let key = crate::state::creation_request_key(&order_hash, &hashlock);
    let request = CREATION_REQUESTS.load(deps.storage, key)?;
    Ok(request_to_response(request))
}

pub fn query_creation_requests(deps: Deps, start_after: Option<String>, limit: Option<u32>) -> StdResult<CreationRequestsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(|s| {
        let mut parts = s.splitn(2, ':');
        let a = parts.next().unwrap_or_default().to_string();
        let b = parts.next().unwrap_or_default().to_string();
        Bound::exclusive((a, b))
    });

    let requests = CREATION_REQUESTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (_, request) = item?;
            Ok(request_to_response(request))
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(CreationRequestsResponse { requests })
}

pub fn query_merkle_index_entry(deps: Deps, order_hash: Hash32, root: Hash32) -> StdResult<MerkleIndexResponse> {
    let key = merkle_index::key(&order_hash, &root);
    match MERKLE_INDEX.may_load(deps.storage, key)? {
        Some(entry) => Ok(MerkleIndexResponse {
            next_expected_index: entry.next_expected_index,
            last_validated_secret_hash: Some(entry.last_validated_secret_hash),
        }),
        None => Ok(MerkleIndexResponse {
            next_expected_index: 0,
            last_validated_secret_hash: None,
        }),
    }
}
