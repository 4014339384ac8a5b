//! HashLock — secret verification and Merkle-proof verification for
//! multi-fill orders (spec.md §4.3).

use sha3::{Digest, Sha3_256};

use crate::error::ContractError;
use crate::primitives::Hash32;

pub fn sha3_256(bytes: &[u8]) -> Hash32 {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    Hash32::from_slice(&hasher.finalize()).expect("sha3-256 output is always 32 bytes")
}

/// `verify_single(secret, hashlock) := H(secret) == hashlock`.
pub fn verify_single(secret: &[u8], hashlock: &Hash32) -> bool {
    sha3_256(secret) == *hashlock
}

/// Reads `parts_amount` from the last 2 bytes of the 32-byte
/// `hashlock_info` blob (big-endian u16), resolving the ambiguity noted as
/// Open Question #2 in spec.md §9 — see DESIGN.md for the rationale. The
/// first 30 bytes are `root_head` (spec.md §4.3); a parts field any wider
/// than 2 bytes would overlap it, so the two literal readings spec.md §9
/// floats ("last 8 bytes" vs. "first 2 bytes") are both rejected in favor
/// of a non-overlapping 2-byte field at the tail.
pub fn extract_parts_amount(hashlock_info: &Hash32) -> u64 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&hashlock_info.0[30..32]);
    u16::from_be_bytes(buf) as u64
}

pub fn validate_merkle_config(root: &Hash32, parts_amount: u64) -> Result<(), ContractError> {
    // root is always 32 bytes by construction of Hash32; the length check
    // from spec.md is preserved for callers constructing from raw bytes
    // via `Hash32::from_slice`, which already enforces it, so here we only
    // need the parts-count floor.
    let _ = root;
    if parts_amount < 2 {
        return Err(ContractError::InvalidConfiguration {
            reason: "parts_amount must be >= 2".into(),
        });
    }
    Ok(())
}

/// A single step of a Merkle proof: the sibling hash and which side it sits
/// on is irrelevant because hashing is commutative (sorted pairwise), so a
/// proof is just an ordered list of sibling hashes.
pub type ProofStep = Hash32;

fn leaf_hash(index: u64, secret_hash: &Hash32) -> Hash32 {
    let mut buf = Vec::with_capacity(8 + 32);
    buf.extend_from_slice(&index.to_le_bytes());
    buf.extend_from_slice(secret_hash.as_bytes());
    sha3_256(&buf)
}

fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a.as_bytes() <= b.as_bytes() { (a, b) } else { (b, a) };
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(lo.as_bytes());
    buf.extend_from_slice(hi.as_bytes());
    sha3_256(&buf)
}

/// Processes `proof` bottom-up from `leaf = H(le_bytes(index) || secret_hash)`,
/// folding each level with commutative (sorted) pairwise hashing so the
/// proof is tree-layout-independent. Returns true iff the reconstructed
/// root equals `root` bit-for-bit.
pub fn verify_merkle(proof: &[ProofStep], index: u64, secret_hash: &Hash32, root: &Hash32) -> bool {
    let mut node = leaf_hash(index, secret_hash);
    for sibling in proof {
        node = hash_pair(&node, sibling);
    }
    node == *root
}
