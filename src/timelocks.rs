//! Timelocks — seven stage offsets plus a deployment timestamp.
//!
//! Mirrors the teacher's `PackedTimelocks` bit-packing idea, but keeps the
//! full `u32` range per stage (the teacher's 8-bit-per-stage layout caps
//! offsets at 255 hours, which the spec's windows routinely exceed) and
//! stores seconds directly rather than hours, matching the literal second
//! offsets used throughout spec.md §8's scenarios.

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub enum Stage {
    SrcWithdrawal,
    SrcPublicWithdrawal,
    SrcCancellation,
    SrcPublicCancellation,
    DstWithdrawal,
    DstPublicWithdrawal,
    DstCancellation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Timelocks {
    pub src_withdrawal: u32,
    pub src_public_withdrawal: u32,
    pub src_cancellation: u32,
    pub src_public_cancellation: u32,
    pub dst_withdrawal: u32,
    pub dst_public_withdrawal: u32,
    pub dst_cancellation: u32,
    pub deployed_at: Option<u32>,
}

impl Timelocks {
    /// Construct and validate the ordering invariant from spec.md §3.
    pub fn new(
        src_withdrawal: u32,
        src_public_withdrawal: u32,
        src_cancellation: u32,
        src_public_cancellation: u32,
        dst_withdrawal: u32,
        dst_public_withdrawal: u32,
        dst_cancellation: u32,
    ) -> Result<Self, ContractError> {
        if !(src_withdrawal <= src_public_withdrawal
            && src_public_withdrawal <= src_cancellation
            && src_cancellation <= src_public_cancellation)
        {
            return Err(ContractError::InvalidTimelock {
                reason: "source stages must be non-decreasing".into(),
            });
        }
        if !(dst_withdrawal <= dst_public_withdrawal && dst_public_withdrawal <= dst_cancellation) {
            return Err(ContractError::InvalidTimelock {
                reason: "destination stages must be non-decreasing".into(),
            });
        }
        Ok(Timelocks {
            src_withdrawal,
            src_public_withdrawal,
            src_cancellation,
            src_public_cancellation,
            dst_withdrawal,
            dst_public_withdrawal,
            dst_cancellation,
            deployed_at: None,
        })
    }

    /// Fixes `deployed_at`. Idempotent in the sense that calling it again
    /// always overwrites with the caller-supplied wall time, matching the
    /// factory-creation path in spec.md §4.1.
    pub fn bind(&mut self, now: u32) {
        self.deployed_at = Some(now);
    }

    pub fn is_bound(&self) -> bool {
        self.deployed_at.is_some()
    }

    fn offset(&self, stage: Stage) -> u32 {
        match stage {
            Stage::SrcWithdrawal => self.src_withdrawal,
            Stage::SrcPublicWithdrawal => self.src_public_withdrawal,
            Stage::SrcCancellation => self.src_cancellation,
            Stage::SrcPublicCancellation => self.src_public_cancellation,
            Stage::DstWithdrawal => self.dst_withdrawal,
            Stage::DstPublicWithdrawal => self.dst_public_withdrawal,
            Stage::DstCancellation => self.dst_cancellation,
        }
    }

    pub fn stage_time(&self, stage: Stage) -> Result<u64, ContractError> {
        let deployed_at = self.deployed_at.ok_or(ContractError::InvalidTimelock {
            reason: "timelocks not yet bound to a deployment time".into(),
        })?;
        Ok(deployed_at as u64 + self.offset(stage) as u64)
    }

    pub fn is_after(&self, now: u64, stage: Stage) -> Result<bool, ContractError> {
        Ok(now >= self.stage_time(stage)?)
    }

    pub fn is_before(&self, now: u64, stage: Stage) -> Result<bool, ContractError> {
        Ok(now < self.stage_time(stage)?)
    }

    pub fn in_window(&self, now: u64, start: Stage, end: Stage) -> Result<bool, ContractError> {
        Ok(self.is_after(now, start)? && self.is_before(now, end)?)
    }

    pub fn rescue_start(&self, rescue_delay: u64) -> Result<u64, ContractError> {
        let deployed_at = self.deployed_at.ok_or(ContractError::InvalidTimelock {
            reason: "timelocks not yet bound to a deployment time".into(),
        })?;
        Ok(deployed_at as u64 + rescue_delay)
    }

    /// Canonical wire encoding: seven little-endian u32 offsets in stage
    /// order followed by little-endian u32 `deployed_at` (0 if unbound).
    /// This is also the packed-u256-equivalent byte layout of spec.md §6 —
    /// read as a 256-bit little-endian integer, bits `[0..32)` are stage 1
    /// and bits `[224..256)` are `deployed_at`, exactly as required for
    /// cross-chain parity with EVM counterparts.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let fields = [
            self.src_withdrawal,
            self.src_public_withdrawal,
            self.src_cancellation,
            self.src_public_cancellation,
            self.dst_withdrawal,
            self.dst_public_withdrawal,
            self.dst_cancellation,
            self.deployed_at.unwrap_or(0),
        ];
        for (i, field) in fields.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&field.to_le_bytes());
        }
        out
    }
}
