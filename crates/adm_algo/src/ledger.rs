//! In-memory seat ledger: the single source of truth for availability during
//! one allocation round.
//!
//! Loaded once at round start from the inventory records; every reservation is
//! decrement-if-positive, every release is increment-if-below-total, so the
//! `0 <= available <= total` bound holds after each individual operation.

use core::fmt;
use std::collections::BTreeMap;

use adm_core::{BranchCode, SeatInventoryRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    total: u32,
    available: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeatLedger {
    slots: BTreeMap<BranchCode, Slot>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    DuplicateBranch(BranchCode),
    AvailableExceedsTotal(BranchCode),
    UnknownBranch(BranchCode),
    /// Release attempted on a branch that already has every seat free.
    AlreadyFull(BranchCode),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::DuplicateBranch(b) => write!(f, "duplicate seat inventory for branch {b}"),
            LedgerError::AvailableExceedsTotal(b) => {
                write!(f, "branch {b}: available seats exceed total seats")
            }
            LedgerError::UnknownBranch(b) => write!(f, "unknown branch {b}"),
            LedgerError::AlreadyFull(b) => write!(f, "branch {b}: no allotted seat to release"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl SeatLedger {
    pub fn from_records(records: &[SeatInventoryRecord]) -> Result<Self, LedgerError> {
        let mut slots = BTreeMap::new();
        for r in records {
            if r.available_seats > r.total_seats {
                return Err(LedgerError::AvailableExceedsTotal(r.branch.clone()));
            }
            let slot = Slot { total: r.total_seats, available: r.available_seats };
            if slots.insert(r.branch.clone(), slot).is_some() {
                return Err(LedgerError::DuplicateBranch(r.branch.clone()));
            }
        }
        Ok(SeatLedger { slots })
    }

    #[inline]
    pub fn contains(&self, branch: &BranchCode) -> bool {
        self.slots.contains_key(branch)
    }

    pub fn available(&self, branch: &BranchCode) -> Option<u32> {
        self.slots.get(branch).map(|s| s.available)
    }

    /// Unknown branches are never open.
    #[inline]
    pub fn has_open(&self, branch: &BranchCode) -> bool {
        self.available(branch).is_some_and(|n| n > 0)
    }

    /// Take one seat if any is left. `Ok(false)` when the branch is exhausted.
    pub fn try_reserve(&mut self, branch: &BranchCode) -> Result<bool, LedgerError> {
        let slot = self
            .slots
            .get_mut(branch)
            .ok_or_else(|| LedgerError::UnknownBranch(branch.clone()))?;
        if slot.available == 0 {
            return Ok(false);
        }
        slot.available -= 1;
        Ok(true)
    }

    pub fn release(&mut self, branch: &BranchCode) -> Result<(), LedgerError> {
        let slot = self
            .slots
            .get_mut(branch)
            .ok_or_else(|| LedgerError::UnknownBranch(branch.clone()))?;
        if slot.available >= slot.total {
            return Err(LedgerError::AlreadyFull(branch.clone()));
        }
        slot.available += 1;
        Ok(())
    }

    /// Force a branch to zero after the backing store refused a reservation.
    pub fn mark_exhausted(&mut self, branch: &BranchCode) {
        if let Some(slot) = self.slots.get_mut(branch) {
            slot.available = 0;
        }
    }

    pub fn total_available(&self) -> u64 {
        self.slots.values().map(|s| s.available as u64).sum()
    }

    /// Records in branch order.
    pub fn to_records(&self) -> Vec<SeatInventoryRecord> {
        self.slots
            .iter()
            .map(|(b, s)| SeatInventoryRecord {
                branch: b.clone(),
                total_seats: s.total,
                available_seats: s.available,
            })
            .collect()
    }
}
