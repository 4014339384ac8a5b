use cosmwasm_std::{entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};

pub mod adapters;
pub mod address;
pub mod contract;
pub mod error;
pub mod escrow;
pub mod events;
pub mod execute;
pub mod factory;
pub mod hashlock;
pub mod merkle_index;
pub mod msg;
pub mod primitives;
pub mod query;
pub mod state;
pub mod timelocks;

pub const CONTRACT_NAME: &str = "crates.io:htlc-escrow-contract";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    execute::execute_instantiate(deps, &env, msg)
}

#[entry_point]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    execute::dispatch(deps, env, info, msg)
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query::query_config(deps)?),
        QueryMsg::Escrow { address } => to_json_binary(&query::query_escrow(deps, address)?),
        QueryMsg::Escrows { start_after, limit } => {
            to_json_binary(&query::query_escrows(deps, start_after, limit)?)
        }
        QueryMsg::EscrowByOrderHash { order_hash } => {
            to_json_binary(&query::query_escrow_by_order_hash(deps, order_hash)?)
        }
        QueryMsg::AddressOfEscrow {
            order_hash,
            hashlock,
            maker,
            taker,
            token_id,
            amount,
            safety_deposit,
            timelocks,
            deployed_at,
            role,
        } => to_json_binary(&query::query_address_of_escrow(
            deps,
            order_hash,
            hashlock,
            maker,
            taker,
            token_id,
            amount,
            safety_deposit,
            timelocks,
            deployed_at,
            role,
        )?),
        QueryMsg::CreationRequest { order_hash, hashlock } => {
            to_json_binary(&query::query_creation_request(deps, order_hash, hashlock)?)
        }
        QueryMsg::CreationRequests { start_after, limit } => {
            to_json_binary(&query::query_creation_requests(deps, start_after, limit)?)
        }
        QueryMsg::MerkleIndexEntry { order_hash, root } => {
            to_json_binary(&query::query_merkle_index_entry(deps, order_hash, root)?)
        }
    }
}

/// Bumps the stored contract version. No storage migration is needed
/// across the versions this crate has shipped so far.
#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let prev = cw2::get_contract_version(deps.storage)?;
    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", prev.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
