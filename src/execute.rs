//! Entry-point orchestration: validates `MessageInfo`/`Env`, turns
//! `escrow.rs`/`factory.rs`'s pure outcomes into `CosmosMsg`s, and builds
//! the `Response` (events + attributes) for every state-changing message.

use cosmwasm_std::{
    coin, coins, to_json_binary, Addr, BankMsg, Coin, CosmosMsg, DepsMut, Env, MessageInfo,
    Response, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use crate::error::ContractError;
use crate::escrow;
use crate::events;
use crate::factory::{self, DestinationCreationInput, MultiFillData, SourceCreationInput};
use crate::msg::{ExecuteMsg, InstantiateMsg, MultiFillInfo, TimelockOffsets};
use crate::primitives::TokenId;
use crate::state::{ESCROWS, FACTORY_STATE};
use crate::timelocks::Timelocks;

fn offsets_to_timelocks(offsets: TimelockOffsets) -> Result<Timelocks, ContractError> {
    Timelocks::new(
        offsets.src_withdrawal,
        offsets.src_public_withdrawal,
        offsets.src_cancellation,
        offsets.src_public_cancellation,
        offsets.dst_withdrawal,
        offsets.dst_public_withdrawal,
        offsets.dst_cancellation,
    )
}

fn outbound_msg(transfer: &escrow::Transfer) -> Result<Option<CosmosMsg>, ContractError> {
    if transfer.amount == 0 {
        return Ok(None);
    }
    if let Some(denom) = transfer.token_id.as_native_denom() {
        return Ok(Some(
            BankMsg::Send {
                to_address: transfer.recipient.to_string(),
                amount: coins(transfer.amount as u128, denom),
            }
            .into(),
        ));
    }
    if let Some(contract_addr) = transfer.token_id.as_cw20_addr() {
        let wasm_msg = WasmMsg::Execute {
            contract_addr: contract_addr.to_string(),
            msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                recipient: transfer.recipient.to_string(),
                amount: Uint128::from(transfer.amount),
            })?,
            funds: vec![],
        };
        return Ok(Some(wasm_msg.into()));
    }
    Err(ContractError::InvalidConfiguration {
        reason: format!("token_id '{}' is neither native:* nor cw20:*", transfer.token_id.0),
    })
}

/// Pulls `amount` of `token_id` from `owner` into this contract: a native
/// transfer must already be attached as `info.funds` (checked by the
/// caller), a cw20 transfer is pulled via `TransferFrom`, which requires
/// `owner` to have pre-approved this contract as spender.
fn inbound_cw20_msg(token_id: &TokenId, owner: &Addr, recipient: &Addr, amount: u64) -> Result<Option<CosmosMsg>, ContractError> {
    if amount == 0 {
        return Ok(None);
    }
    match token_id.as_cw20_addr() {
        Some(contract_addr) => Ok(Some(
            WasmMsg::Execute {
                contract_addr: contract_addr.to_string(),
                msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
                    owner: owner.to_string(),
                    recipient: recipient.to_string(),
                    amount: Uint128::from(amount),
                })?,
                funds: vec![],
            }
            .into(),
        )),
        None => Ok(None),
    }
}

fn required_native_funds(token_id: &TokenId, amount: u64, deposit: u64) -> Vec<Coin> {
    let mut required: Vec<Coin> = Vec::new();
    if let Some(denom) = token_id.as_native_denom() {
        if amount > 0 {
            required.push(coin(amount as u128, denom));
        }
    }
    if deposit > 0 {
        match required.iter_mut().find(|c| c.denom == escrow::NATIVE_DEPOSIT_DENOM) {
            Some(c) => c.amount += Uint128::from(deposit),
            None => required.push(coin(deposit as u128, escrow::NATIVE_DEPOSIT_DENOM)),
        }
    }
    required
}

fn check_and_refund(info: &MessageInfo, required: &[Coin]) -> Result<Vec<CosmosMsg>, ContractError> {
    for req in required {
        let sent = info
            .funds
            .iter()
            .find(|c| c.denom == req.denom)
            .map(|c| c.amount)
            .unwrap_or_default();
        if sent < req.amount {
            return Err(ContractError::InsufficientBalance {
                reason: format!("expected at least {} {}, got {}", req.amount, req.denom, sent),
            });
        }
    }
    let mut refund = Vec::new();
    for sent in &info.funds {
        let needed = required
            .iter()
            .find(|c| c.denom == sent.denom)
            .map(|c| c.amount)
            .unwrap_or_default();
        if sent.amount > needed {
            refund.push(Coin {
                denom: sent.denom.clone(),
                amount: sent.amount - needed,
            });
        }
    }
    if refund.is_empty() {
        Ok(vec![])
    } else {
        Ok(vec![BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: refund,
        }
        .into()])
    }
}

pub fn execute_instantiate(deps: DepsMut, env: &Env, msg: InstantiateMsg) -> Result<Response, ContractError> {
    cw2::set_contract_version(deps.storage, crate::CONTRACT_NAME, crate::CONTRACT_VERSION)?;

    factory::initialize(
        deps.storage,
        deps.api.addr_validate(&msg.owner)?,
        msg.factory_id.clone(),
        msg.src_rescue_delay,
        msg.dst_rescue_delay,
        deps.api.addr_validate(&msg.fee_bank)?,
        deps.api.addr_validate(&msg.access_token)?,
        msg.access_token_threshold,
        msg.resolver_fee,
        msg.whitelist_discount_numerator,
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("factory_id", msg.factory_id)
        .add_attribute("owner", msg.owner)
        .add_attribute("timestamp", env.block.time.seconds().to_string()))
}

pub fn execute_pre_interaction(
    deps: DepsMut,
    env: &Env,
    info: MessageInfo,
    order_hash: crate::primitives::Hash32,
    hashlock_info: crate::primitives::Hash32,
    taker: String,
    making_amount: u64,
    taking_amount: u64,
    remaining_making_amount: u64,
) -> Result<Response, ContractError> {
    cw_utils::nonpayable(&info)?;
    let taker = deps.api.addr_validate(&taker)?;
    let now = env.block.time.seconds();
    factory::pre_interaction(deps.storage, &order_hash, &hashlock_info, now)?;

    Ok(Response::new()
        .add_event(events::order_filled(&order_hash, taker.as_str(), making_amount as u128, taking_amount as u128, 0, now))
        .add_attribute("action", "pre_interaction")
        .add_attribute("order_hash", order_hash.to_hex())
        .add_attribute("remaining_making_amount", remaining_making_amount.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_post_interaction(
    deps: DepsMut,
    env: &Env,
    info: MessageInfo,
    order_hash: crate::primitives::Hash32,
    hashlock_info: crate::primitives::Hash32,
    maker: String,
    taker: String,
    token_id: String,
    making_amount: u64,
    taking_amount: u64,
    remaining_making_amount: u64,
    timelocks: TimelockOffsets,
    deposits: u128,
    dst_chain_id: String,
    dst_token_id: String,
    dst_amount: u64,
    multi_fill: Option<MultiFillInfo>,
    whitelist: Vec<String>,
    access_token_balance: u64,
) -> Result<Response, ContractError> {
    let now = env.block.time.seconds();
    let maker = deps.api.addr_validate(&maker)?;
    let taker = deps.api.addr_validate(&taker)?;
    let whitelist = whitelist
        .iter()
        .map(|w| deps.api.addr_validate(w))
        .collect::<Result<Vec<_>, _>>()?;

    let src_safety_deposit = (deposits >> 64) as u64;
    let dst_safety_deposit = deposits as u64;

    let multi_fill_data = multi_fill.map(|mf| MultiFillData {
        root: mf.root,
        proof: mf.proof,
        leaf_index: mf.leaf_index,
        secret_hash: mf.secret_hash,
        parts: mf.parts,
        order_making_amount: mf.order_making_amount as u128,
        remaining_making_amount_before: mf.remaining_making_amount_before as u128,
    });

    let input = SourceCreationInput {
        order_hash,
        hashlock_info,
        maker: maker.clone(),
        taker: taker.clone(),
        token_id: TokenId(token_id),
        making_amount,
        remaining_making_amount,
        timelocks: offsets_to_timelocks(timelocks)?,
        src_safety_deposit,
        dst_safety_deposit,
        dst_maker: maker.clone(),
        dst_chain_id,
        dst_token_id: TokenId(dst_token_id),
        dst_amount,
        multi_fill: multi_fill_data,
        whitelist,
        access_token_balance,
    };

    let outcome = factory::create_source(deps.storage, now, input)?;

    let required = required_native_funds(&outcome.immutables.token_id, outcome.immutables.amount, src_safety_deposit);
    let mut msgs = check_and_refund(&info, &required)?;
    if let Some(pull) = inbound_cw20_msg(&outcome.immutables.token_id, &maker, &env.contract.address, outcome.immutables.amount)? {
        msgs.push(pull);
    }

    let mut response = Response::new()
        .add_messages(msgs)
        .add_event(events::escrow_created(&outcome.address, &outcome.immutables, crate::primitives::Role::Source, now))
        .add_event(events::src_escrow_created(&outcome.address, &outcome.immutables, &outcome.dst_complement, now))
        .add_attribute("action", "post_interaction")
        .add_attribute("address", outcome.address.to_hex())
        .add_attribute("taker", taker.to_string());

    if let Some(secret_validated) = &outcome.secret_validated {
        response = response.add_event(events::secret_validated(
            &secret_validated.order_hash,
            &secret_validated.root_head_hex,
            secret_validated.index,
            &secret_validated.secret_hash,
            now,
        ));
    }

    if let Some(fee) = outcome.fee_charge {
        response = response.add_attribute("resolver_fee_charged", fee.to_string());
    }
    Ok(response)
}

pub fn execute_cancel_creation_request(
    deps: DepsMut,
    _env: &Env,
    _info: MessageInfo,
    order_hash: crate::primitives::Hash32,
    hashlock: crate::primitives::Hash32,
) -> Result<Response, ContractError> {
    factory::cancel_creation_request(deps.storage, &order_hash, &hashlock)?;
    Ok(Response::new()
        .add_attribute("action", "cancel_creation_request")
        .add_attribute("order_hash", order_hash.to_hex())
        .add_attribute("hashlock", hashlock.to_hex()))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_create_destination(
    deps: DepsMut,
    env: &Env,
    info: MessageInfo,
    order_hash: crate::primitives::Hash32,
    hashlock: crate::primitives::Hash32,
    maker: String,
    taker: String,
    token_id: String,
    amount: u64,
    safety_deposit: u64,
    timelocks: TimelockOffsets,
    src_cancellation_timestamp: u64,
) -> Result<Response, ContractError> {
    let now = env.block.time.seconds();
    let maker = deps.api.addr_validate(&maker)?;
    let taker = deps.api.addr_validate(&taker)?;
    let token_id = TokenId(token_id);

    let required = required_native_funds(&token_id, amount, safety_deposit);
    let mut msgs = check_and_refund(&info, &required)?;
    if let Some(pull) = inbound_cw20_msg(&token_id, &taker, &env.contract.address, amount)? {
        msgs.push(pull);
    }

    let input = DestinationCreationInput {
        order_hash,
        hashlock,
        maker,
        taker: taker.clone(),
        token_id,
        amount,
        safety_deposit,
        timelocks: offsets_to_timelocks(timelocks)?,
        src_cancellation_timestamp,
    };

    let outcome = factory::create_destination(deps.storage, now, input)?;

    Ok(Response::new()
        .add_messages(msgs)
        .add_event(events::escrow_created(&outcome.address, &outcome.immutables, crate::primitives::Role::Destination, now))
        .add_event(events::dst_escrow_created(&outcome.address, &outcome.immutables.hashlock, taker.as_str(), now))
        .add_attribute("action", "create_destination")
        .add_attribute("address", outcome.address.to_hex()))
}

fn load_record(deps: &DepsMut, address: &str) -> Result<crate::state::EscrowRecord, ContractError> {
    ESCROWS.load(deps.storage, address.to_string()).map_err(|_| ContractError::NotFound {
        reason: format!("no escrow at address {address}"),
    })
}

fn save_outcome(
    deps: DepsMut,
    address: &str,
    record: crate::state::EscrowRecord,
    outcome: escrow::SettlementOutcome,
    action: &str,
    now: u64,
) -> Result<Response, ContractError> {
    ESCROWS.save(deps.storage, address.to_string(), &record)?;

    let mut msgs = Vec::new();
    if let Some(m) = outbound_msg(&outcome.principal)? {
        msgs.push(m);
    }
    if let Some(m) = outbound_msg(&outcome.deposit)? {
        msgs.push(m);
    }

    let mut response = Response::new().add_messages(msgs).add_attribute("action", action);
    response = match &outcome.secret_hex {
        Some(secret_hex) => response.add_event(events::withdrawn(
            &record_address(address)?,
            secret_hex,
            outcome.principal.recipient.as_str(),
            outcome.principal.amount,
            now,
        )),
        None => response.add_event(events::cancelled(
            &record_address(address)?,
            outcome.principal.recipient.as_str(),
            outcome.principal.amount,
            now,
        )),
    };
    Ok(response)
}

fn record_address(hex: &str) -> Result<crate::primitives::Hash32, ContractError> {
    crate::primitives::Hash32::from_hex(hex).map_err(ContractError::from)
}

/// The wire `secret` field is hex-encoded, matching `Hash32`'s own
/// string encoding, so a caller observing a revealed secret on the
/// counterpart chain can round-trip it without a separate encoding
/// convention.
fn decode_secret(secret: &str) -> Result<Vec<u8>, ContractError> {
    hex::decode(secret).map_err(|_| ContractError::InvalidSecret {})
}

fn withdraw_entry(
    deps: DepsMut,
    env: &Env,
    info: MessageInfo,
    address: String,
    secret: String,
    public: bool,
) -> Result<Response, ContractError> {
    cw_utils::nonpayable(&info)?;
    let now = env.block.time.seconds();
    let mut record = load_record(&deps, &address)?;
    let supplied = record.immutables.clone();
    let secret_bytes = decode_secret(&secret)?;
    let outcome = if public {
        escrow::public_withdraw(&mut record, &info.sender, &supplied, &secret_bytes, now)?
    } else {
        escrow::withdraw(&mut record, &info.sender, &supplied, &secret_bytes, now)?
    };
    save_outcome(deps, &address, record, outcome, if public { "public_withdraw" } else { "withdraw" }, now)
}

fn cancel_entry(
    deps: DepsMut,
    env: &Env,
    info: MessageInfo,
    address: String,
    public: bool,
) -> Result<Response, ContractError> {
    cw_utils::nonpayable(&info)?;
    let now = env.block.time.seconds();
    let mut record = load_record(&deps, &address)?;
    let supplied = record.immutables.clone();
    let outcome = if public {
        escrow::public_cancel(&mut record, &info.sender, &supplied, now)?
    } else {
        escrow::cancel(&mut record, &info.sender, &supplied, now)?
    };
    save_outcome(deps, &address, record, outcome, if public { "public_cancel" } else { "cancel" }, now)
}

pub fn execute_withdraw_src(deps: DepsMut, env: Env, info: MessageInfo, address: String, secret: String) -> Result<Response, ContractError> {
    withdraw_entry(deps, &env, info, address, secret, false)
}

pub fn execute_withdraw_dst(deps: DepsMut, env: Env, info: MessageInfo, address: String, secret: String) -> Result<Response, ContractError> {
    withdraw_entry(deps, &env, info, address, secret, false)
}

pub fn execute_public_withdraw_src(deps: DepsMut, env: Env, info: MessageInfo, address: String, secret: String) -> Result<Response, ContractError> {
    withdraw_entry(deps, &env, info, address, secret, true)
}

pub fn execute_public_withdraw_dst(deps: DepsMut, env: Env, info: MessageInfo, address: String, secret: String) -> Result<Response, ContractError> {
    withdraw_entry(deps, &env, info, address, secret, true)
}

pub fn execute_cancel_src(deps: DepsMut, env: Env, info: MessageInfo, address: String) -> Result<Response, ContractError> {
    cancel_entry(deps, &env, info, address, false)
}

pub fn execute_cancel_dst(deps: DepsMut, env: Env, info: MessageInfo, address: String) -> Result<Response, ContractError> {
    cancel_entry(deps, &env, info, address, false)
}

pub fn execute_public_cancel_src(deps: DepsMut, env: Env, info: MessageInfo, address: String) -> Result<Response, ContractError> {
    cancel_entry(deps, &env, info, address, true)
}

pub fn execute_rescue(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    address: String,
    token_id: String,
    amount: u64,
) -> Result<Response, ContractError> {
    cw_utils::nonpayable(&info)?;
    let now = env.block.time.seconds();
    let record = load_record(&deps, &address)?;
    let supplied = record.immutables.clone();
    let factory = FACTORY_STATE.load(deps.storage)?;
    let rescue_delay = match record.role {
        crate::primitives::Role::Source => factory.src_rescue_delay,
        crate::primitives::Role::Destination => factory.dst_rescue_delay,
    };
    escrow::rescue(&record, &info.sender, &supplied, rescue_delay, now)?;

    let token_id = TokenId(token_id);
    let transfer = escrow::Transfer {
        token_id,
        recipient: info.sender.clone(),
        amount,
    };
    let mut msgs = Vec::new();
    if let Some(m) = outbound_msg(&transfer)? {
        msgs.push(m);
    }

    let escrow_address = record_address(&address)?;
    Ok(Response::new()
        .add_messages(msgs)
        .add_event(events::rescued(&escrow_address, &transfer.token_id.0, amount, info.sender.as_str(), now))
        .add_attribute("action", "rescue")
        .add_attribute("address", address))
}

pub fn dispatch(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::PreInteraction {
            order_hash,
            hashlock_info,
            taker,
            making_amount,
            taking_amount,
            remaining_making_amount,
        } => execute_pre_interaction(deps, &env, info, order_hash, hashlock_info, taker, making_amount, taking_amount, remaining_making_amount),
        ExecuteMsg::PostInteraction {
            order_hash,
            hashlock_info,
            maker,
            taker,
            token_id,
            making_amount,
            taking_amount,
            remaining_making_amount,
            timelocks,
            deposits,
            dst_chain_id,
            dst_token_id,
            dst_amount,
            multi_fill,
            whitelist,
            access_token_balance,
        } => execute_post_interaction(
            deps,
            &env,
            info,
            order_hash,
            hashlock_info,
            maker,
            taker,
            token_id,
            making_amount,
            taking_amount,
            remaining_making_amount,
            timelocks,
            deposits,
            dst_chain_id,
            dst_token_id,
            dst_amount,
            multi_fill,
            whitelist,
            access_token_balance,
        ),
        ExecuteMsg::CancelCreationRequest { order_hash, hashlock } => {
            execute_cancel_creation_request(deps, &env, info, order_hash, hashlock)
        }
        ExecuteMsg::CreateDestination {
            order_hash,
            hashlock,
            maker,
            taker,
            token_id,
            amount,
            safety_deposit,
            timelocks,
            src_cancellation_timestamp,
        } => execute_create_destination(
            deps,
            &env,
            info,
            order_hash,
            hashlock,
            maker,
            taker,
            token_id,
            amount,
            safety_deposit,
            timelocks,
            src_cancellation_timestamp,
        ),
        ExecuteMsg::WithdrawSrc { address, secret } => execute_withdraw_src(deps, env, info, address, secret),
        ExecuteMsg::CancelSrc { address } => execute_cancel_src(deps, env, info, address),
        ExecuteMsg::PublicWithdrawSrc { address, secret } => execute_public_withdraw_src(deps, env, info, address, secret),
        ExecuteMsg::PublicCancelSrc { address } => execute_public_cancel_src(deps, env, info, address),
        ExecuteMsg::WithdrawDst { address, secret } => execute_withdraw_dst(deps, env, info, address, secret),
        ExecuteMsg::CancelDst { address } => execute_cancel_dst(deps, env, info, address),
        ExecuteMsg::PublicWithdrawDst { address, secret } => execute_public_withdraw_dst(deps, env, info, address, secret),
        ExecuteMsg::Rescue { address, token_id, amount } => execute_rescue(deps, env, info, address, token_id, amount),
    }
}
