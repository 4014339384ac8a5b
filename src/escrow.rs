//! EscrowInstance — the custody container and its one-shot state machine
//! (spec.md §4.5). Pure decision logic lives here; `execute.rs` wires it to
//! CosmWasm's `Deps`/`Env`/`MessageInfo` and turns `Transfer`s into
//! `CosmosMsg`s.

use cosmwasm_std::Addr;

use crate::address::immutables_hash;
use crate::error::ContractError;
use crate::hashlock::verify_single;
use crate::primitives::{Hash32, Role, TokenId};
use crate::state::{EscrowLifecycle, EscrowRecord, Immutables};
use crate::timelocks::Stage;

/// A single outbound asset movement the caller must turn into a
/// `CosmosMsg` (native `BankMsg::Send` or cw20 `Transfer`, per `TokenId`).
pub struct Transfer {
    pub token_id: TokenId,
    pub recipient: Addr,
    pub amount: u64,
}

pub struct SettlementOutcome {
    pub principal: Transfer,
    pub deposit: Transfer,
    pub secret_hex: Option<String>,
}

/// Native-coin safety deposits are always denominated in the chain's
/// staking/fee token; the teacher's contract hardcodes `"uatom"` and this
/// engine keeps that choice rather than inventing a configurable denom the
/// spec never asks for.
pub const NATIVE_DEPOSIT_DENOM: &str = "uatom";

fn deposit_token_id() -> TokenId {
    TokenId::native(NATIVE_DEPOSIT_DENOM)
}

fn check_immutables_match(record: &EscrowRecord, supplied: &Immutables) -> Result<(), ContractError> {
    if immutables_hash(supplied) != immutables_hash(&record.immutables) {
        return Err(ContractError::ImmutablesMismatch {
            reason: "supplied immutables do not hash to the stored escrow's immutables".into(),
        });
    }
    Ok(())
}

fn check_active(record: &EscrowRecord) -> Result<(), ContractError> {
    if !record.is_active() {
        return Err(ContractError::AlreadySettled {});
    }
    Ok(())
}

fn check_secret(effective_hashlock: &Hash32, secret: &[u8]) -> Result<(), ContractError> {
    if !verify_single(secret, effective_hashlock) {
        return Err(ContractError::InvalidSecret {});
    }
    Ok(())
}

/// `withdraw` — only the taker, in the role-appropriate private window.
///
/// `record.immutables.hashlock` is always the *effective* hashlock: for
/// single-fill orders it is `H(secret)` directly; for multi-fill orders the
/// factory resolves it to the Merkle-validated leaf's secret hash at
/// creation time (spec.md §4.6 step 2), so this function never needs to
/// re-consult the Merkle index.
pub fn withdraw(
    record: &mut EscrowRecord,
    caller: &Addr,
    supplied: &Immutables,
    secret: &[u8],
    now: u64,
) -> Result<SettlementOutcome, ContractError> {
    check_active(record)?;
    check_immutables_match(record, supplied)?;

    if *caller != record.immutables.taker {
        return Err(ContractError::Unauthorized {
            reason: "only the taker may withdraw".into(),
        });
    }
    check_secret(&record.immutables.hashlock, secret)?;

    let (start, end) = match record.role {
        Role::Source => (Stage::SrcWithdrawal, Stage::SrcCancellation),
        Role::Destination => (Stage::DstWithdrawal, Stage::DstCancellation),
    };
    if !record.immutables.timelocks.in_window(now, start, end)? {
        return Err(ContractError::StageWindow {
            reason: "withdraw called outside the private withdrawal window".into(),
        });
    }

    let recipient = match record.role {
        Role::Source => record.immutables.taker.clone(),
        Role::Destination => record.immutables.maker.clone(),
    };
    settle(record, caller, recipient, Some(hex::encode(secret)))
}

/// `public_withdraw` — anyone, in the role-appropriate public window.
pub fn public_withdraw(
    record: &mut EscrowRecord,
    caller: &Addr,
    supplied: &Immutables,
    secret: &[u8],
    now: u64,
) -> Result<SettlementOutcome, ContractError> {
    check_active(record)?;
    check_immutables_match(record, supplied)?;
    check_secret(&record.immutables.hashlock, secret)?;

    let (start, end) = match record.role {
        Role::Source => (Stage::SrcPublicWithdrawal, Stage::SrcCancellation),
        Role::Destination => (Stage::DstPublicWithdrawal, Stage::DstCancellation),
    };
    if !record.immutables.timelocks.in_window(now, start, end)? {
        return Err(ContractError::StageWindow {
            reason: "public_withdraw called outside the public withdrawal window".into(),
        });
    }

    let recipient = match record.role {
        Role::Source => record.immutables.taker.clone(),
        Role::Destination => record.immutables.maker.clone(),
    };
    settle(record, caller, recipient, Some(hex::encode(secret)))
}

/// `cancel` — taker for Destination; maker for Source, but the
/// resolver-private window additionally permits the taker to trigger a
/// Source cancel (spec.md §4.5's carried-over reference behavior).
pub fn cancel(
    record: &mut EscrowRecord,
    caller: &Addr,
    supplied: &Immutables,
    now: u64,
) -> Result<SettlementOutcome, ContractError> {
    check_active(record)?;
    check_immutables_match(record, supplied)?;

    let authorized = match record.role {
        Role::Destination => *caller == record.immutables.taker,
        Role::Source => *caller == record.immutables.maker || *caller == record.immutables.taker,
    };
    if !authorized {
        return Err(ContractError::Unauthorized {
            reason: "caller is not entitled to cancel this escrow".into(),
        });
    }

    let stage = match record.role {
        Role::Source => Stage::SrcCancellation,
        Role::Destination => Stage::DstCancellation,
    };
    if !record.immutables.timelocks.is_after(now, stage)? {
        return Err(ContractError::StageWindow {
            reason: "cancel called before its cancellation stage".into(),
        });
    }

    let recipient = match record.role {
        Role::Source => record.immutables.maker.clone(),
        Role::Destination => record.immutables.taker.clone(),
    };
    settle(record, caller, recipient, None)
}

/// `public_cancel` — anyone, Source only, after the public cancellation
/// stage. There is no public cancellation window for Destination.
pub fn public_cancel(
    record: &mut EscrowRecord,
    caller: &Addr,
    supplied: &Immutables,
    now: u64,
) -> Result<SettlementOutcome, ContractError> {
    check_active(record)?;
    check_immutables_match(record, supplied)?;

    if record.role != Role::Source {
        return Err(ContractError::Unauthorized {
            reason: "public_cancel is only available for source escrows".into(),
        });
    }
    if !record.immutables.timelocks.is_after(now, Stage::SrcPublicCancellation)? {
        return Err(ContractError::StageWindow {
            reason: "public_cancel called before its public cancellation stage".into(),
        });
    }

    let recipient = record.immutables.maker.clone();
    settle(record, caller, recipient, None)
}

fn settle(
    record: &mut EscrowRecord,
    caller: &Addr,
    principal_recipient: Addr,
    secret_hex: Option<String>,
) -> Result<SettlementOutcome, ContractError> {
    let principal = Transfer {
        token_id: record.immutables.token_id.clone(),
        recipient: principal_recipient,
        amount: record.principal_balance,
    };
    let deposit = Transfer {
        token_id: deposit_token_id(),
        recipient: caller.clone(),
        amount: record.deposit_balance,
    };

    record.principal_balance = 0;
    record.deposit_balance = 0;
    record.state = match &secret_hex {
        Some(s) => EscrowLifecycle::Withdrawn { secret_hex: s.clone() },
        None => EscrowLifecycle::Cancelled,
    };

    Ok(SettlementOutcome {
        principal,
        deposit,
        secret_hex,
    })
}

/// `rescue` — taker only, only after `deployed_at + rescue_delay`. Does
/// not require the escrow to still be `Active`: emergency recovery must
/// work even after a terminal transition has zeroed the tracked balances,
/// for a foreign asset that was never part of `principal`/`deposit`.
pub fn rescue(
    record: &EscrowRecord,
    caller: &Addr,
    supplied: &Immutables,
    rescue_delay: u64,
    now: u64,
) -> Result<(), ContractError> {
    check_immutables_match(record, supplied)?;
    if *caller != record.immutables.taker {
        return Err(ContractError::Unauthorized {
            reason: "only the taker may rescue funds".into(),
        });
    }
    let rescue_start = record.immutables.timelocks.rescue_start(rescue_delay)?;
    if now < rescue_start {
        return Err(ContractError::StageWindow {
            reason: "rescue delay has not elapsed".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashlock::sha3_256;
    use crate::primitives::TokenId;
    use crate::state::{DstImmutablesComplement, EscrowLifecycle};
    use crate::timelocks::Timelocks;

    fn record_with(role: Role, secret: &[u8]) -> EscrowRecord {
        let mut tl = Timelocks::new(10, 120, 121, 122, 10, 100, 101).unwrap();
        tl.bind(1_700_000_000);
        let immutables = Immutables {
            order_hash: Hash32([9u8; 32]),
            hashlock: sha3_256(secret),
            maker: Addr::unchecked("maker"),
            taker: Addr::unchecked("taker"),
            token_id: TokenId::native("uatom"),
            amount: 10_000,
            safety_deposit: 1_000,
            timelocks: tl,
        };
        EscrowRecord {
            role,
            immutables,
            dst_complement: None,
            state: EscrowLifecycle::Active,
            principal_balance: 10_000,
            deposit_balance: 1_000,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn scenario_a_happy_path_destination_withdraw() {
        let secret = b"my_secret_password_for_swap_test";
        let mut record = record_with(Role::Destination, secret);
        let supplied = record.immutables.clone();
        let caller = Addr::unchecked("taker");

        let outcome = withdraw(&mut record, &caller, &supplied, secret, 1_700_000_015).unwrap();
        assert_eq!(outcome.principal.recipient, Addr::unchecked("maker"));
        assert_eq!(outcome.principal.amount, 10_000);
        assert_eq!(outcome.deposit.recipient, Addr::unchecked("taker"));
        assert_eq!(outcome.deposit.amount, 1_000);
        assert!(matches!(record.state, EscrowLifecycle::Withdrawn { .. }));
        assert_eq!(record.principal_balance, 0);
        assert_eq!(record.deposit_balance, 0);
    }

    #[test]
    fn scenario_b_wrong_secret() {
        let secret = b"my_secret_password_for_swap_test";
        let mut record = record_with(Role::Destination, secret);
        let supplied = record.immutables.clone();
        let caller = Addr::unchecked("taker");

        let err = withdraw(
            &mut record,
            &caller,
            &supplied,
            b"wrong_secret_will_fail_withdrawal",
            1_700_000_015,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::InvalidSecret {}));
        assert!(record.is_active());
        assert_eq!(record.principal_balance, 10_000);
    }

    #[test]
    fn scenario_c_source_public_cancel_after_timeout() {
        let secret = b"s";
        let mut record = record_with(Role::Source, secret);
        let supplied = record.immutables.clone();
        let caller = Addr::unchecked("anyone");

        let outcome = public_cancel(&mut record, &caller, &supplied, 1_700_000_200).unwrap();
        assert_eq!(outcome.principal.recipient, Addr::unchecked("maker"));
        assert_eq!(outcome.principal.amount, 10_000);
        assert_eq!(outcome.deposit.recipient, Addr::unchecked("anyone"));
        assert_eq!(outcome.deposit.amount, 1_000);
        assert!(matches!(record.state, EscrowLifecycle::Cancelled));
    }

    #[test]
    fn single_settlement_rejects_second_call() {
        let secret = b"s";
        let mut record = record_with(Role::Source, secret);
        let supplied = record.immutables.clone();
        let caller = Addr::unchecked("anyone");

        public_cancel(&mut record, &caller, &supplied, 1_700_000_200).unwrap();
        let err = public_cancel(&mut record, &caller, &supplied, 1_700_000_200).unwrap_err();
        assert!(matches!(err, ContractError::AlreadySettled {}));
    }

    #[test]
    fn immutables_mismatch_is_rejected() {
        let secret = b"s";
        let mut record = record_with(Role::Source, secret);
        let mut supplied = record.immutables.clone();
        supplied.amount += 1;
        let caller = Addr::unchecked("taker");

        let err = cancel(&mut record, &caller, &supplied, 1_700_000_200).unwrap_err();
        assert!(matches!(err, ContractError::ImmutablesMismatch { .. }));
    }

    #[test]
    fn dst_complement_field_survives_clone() {
        let secret = b"s";
        let mut record = record_with(Role::Source, secret);
        record.dst_complement = Some(DstImmutablesComplement {
            maker_on_dst: Addr::unchecked("maker-dst"),
            amount: 100,
            token_id: TokenId::native("uatom"),
            safety_deposit: 10,
            dst_chain_id: "dst-1".into(),
        });
        assert!(record.dst_complement.is_some());
    }
}
