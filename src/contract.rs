//! Small helpers consulted by the query layer that don't fit naturally
//! into `query.rs`'s one-handler-per-`QueryMsg`-variant shape.

use cosmwasm_std::{Deps, Order, StdResult};

use crate::state::{EscrowLifecycle, ESCROWS};

/// Counts escrows still in the `Active` lifecycle state.
pub fn get_active_escrow_count(deps: Deps) -> StdResult<u64> {
    let mut count = 0u64;
    for result in ESCROWS.range(deps.storage, None, None, Order::Ascending) {
        let (_, record) = result?;
        if matches!(record.state, EscrowLifecycle::Active) {
            count += 1;
        }
    }
    Ok(count)
}

/// `(total, active)` escrow counts, for a single cheap query-time scan.
pub fn get_escrow_stats(deps: Deps) -> StdResult<(u64, u64)> {
    let mut total = 0u64;
    let mut active = 0u64;
    for result in ESCROWS.range(deps.storage, None, None, Order::Ascending) {
        let (_, record) = result?;
        total += 1;
        if matches!(record.state, EscrowLifecycle::Active) {
            active += 1;
        }
    }
    Ok((total, active))
}
