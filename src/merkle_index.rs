//! MerkleIndex — per-order tracking of the last-validated secret index
//! across partial fills (spec.md §4.4).

use cw_storage_plus::Map;
use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::hashlock::{verify_merkle, ProofStep};
use crate::primitives::Hash32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MerkleIndexEntry {
    pub next_expected_index: u64,
    pub last_validated_secret_hash: Hash32,
}

/// Keyed by `(order_hash_hex, root_head_hex)`.
pub const MERKLE_INDEX: Map<(String, String), MerkleIndexEntry> = Map::new("merkle_index");

pub fn key(order_hash: &Hash32, root: &Hash32) -> (String, String) {
    (order_hash.to_hex(), hex::encode(root.root_head()))
}

/// Closed-form partial-fill acceptance rule from spec.md §4.4.
///
/// `filled_before = order_making - remaining_making` (cumulative making
/// amount already filled before this fill). `idx_prev`/`idx_now` are
/// `floor((filled - 1) * parts / order_making)`, undefined (None) when
/// `filled == 0`.
pub fn required_validated_index(
    order_making: u128,
    remaining_making: u128,
    this_fill: u128,
    parts: u64,
) -> Result<u64, ContractError> {
    if order_making == 0 {
        return Err(ContractError::InvalidConfiguration {
            reason: "order_making must be non-zero".into(),
        });
    }
    let filled_before = order_making
        .checked_sub(remaining_making)
        .ok_or(ContractError::InvalidConfiguration {
            reason: "remaining_making exceeds order_making".into(),
        })?;
    let filled_after = filled_before + this_fill;

    let idx = |filled: u128| -> Option<u64> {
        if filled == 0 {
            None
        } else {
            Some((((filled - 1) * parts as u128) / order_making) as u64)
        }
    };

    let idx_prev = idx(filled_before);
    let idx_now = idx(filled_after).expect("filled_after > 0 whenever this_fill > 0");

    let is_first_fill = remaining_making == order_making;
    let is_completion_fill = this_fill == remaining_making && !is_first_fill;

    if is_first_fill {
        Ok(idx_now + 1)
    } else if is_completion_fill {
        Ok(idx_now + 2)
    } else {
        // Middle fill: require idx_now != idx_prev.
        if idx_prev == Some(idx_now) {
            return Err(ContractError::InvalidSecretIndex {
                reason: "fill does not cross a new Merkle leaf boundary".into(),
            });
        }
        Ok(idx_now + 1)
    }
}

/// Verifies the Merkle proof, checks the validated index against the
/// partial-fill acceptance rule, then upserts the per-order entry. Replays
/// and stale indices fail with `InvalidSecretIndex`.
#[allow(clippy::too_many_arguments)]
pub fn validate_and_record(
    storage: &mut dyn cosmwasm_std::Storage,
    order_hash: &Hash32,
    root: &Hash32,
    proof: &[ProofStep],
    validated_index: u64,
    secret_hash: &Hash32,
    order_making: u128,
    remaining_making: u128,
    this_fill: u128,
    parts: u64,
) -> Result<(), ContractError> {
    if !verify_merkle(proof, validated_index, secret_hash, root) {
        return Err(ContractError::InvalidSecret {});
    }

    let required = required_validated_index(order_making, remaining_making, this_fill, parts)?;
    if validated_index != required {
        return Err(ContractError::InvalidSecretIndex {
            reason: format!("expected index {required}, got {validated_index}"),
        });
    }

    let k = key(order_hash, root);
    if let Some(existing) = MERKLE_INDEX.may_load(storage, k.clone())? {
        if validated_index < existing.next_expected_index {
            return Err(ContractError::InvalidSecretIndex {
                reason: "stale or replayed index".into(),
            });
        }
    }

    MERKLE_INDEX.save(
        storage,
        k,
        &MerkleIndexEntry {
            next_expected_index: validated_index + 1,
            last_validated_secret_hash: *secret_hash,
        },
    )?;
    Ok(())
}
