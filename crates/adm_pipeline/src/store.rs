//! Collaborator seams: the application store and the seat inventory store.
//!
//! The engine only ever talks to these traits. `MemoryStore` implements both
//! and backs the CLI (loaded from and written back to a cycle snapshot).

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use adm_core::{ApplicantRecord, ApplicationStatus, BranchCode, SeatInventoryRecord, StudentId, StudentResponse};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no applicant with id {0}")]
    NotFound(StudentId),
    #[error("unknown branch {0}")]
    UnknownBranch(BranchCode),
    #[error("branch {0}: release would exceed total seats")]
    SeatOverflow(BranchCode),
    #[error("duplicate {0}")]
    Duplicate(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub trait ApplicationStore {
    /// Records in store (submission) order.
    fn by_status(&self, status: ApplicationStatus) -> Result<Vec<ApplicantRecord>, StoreError>;
    fn by_response(&self, response: StudentResponse) -> Result<Vec<ApplicantRecord>, StoreError>;
    fn get(&self, id: &StudentId) -> Result<ApplicantRecord, StoreError>;
    /// Replace the stored record with the same `student_id`.
    fn save(&mut self, record: &ApplicantRecord) -> Result<(), StoreError>;
    fn all(&self) -> Result<Vec<ApplicantRecord>, StoreError>;
}

pub trait SeatInventoryStore {
    fn load_all(&self) -> Result<Vec<SeatInventoryRecord>, StoreError>;
    /// Decrement-if-positive. `Ok(false)` when the branch has no seat left.
    fn try_reserve(&mut self, branch: &BranchCode) -> Result<bool, StoreError>;
    /// Increment-if-below-total.
    fn release(&mut self, branch: &BranchCode) -> Result<(), StoreError>;
}

/// Both stores of one admission cycle.
pub trait CycleStore: ApplicationStore + SeatInventoryStore {}

impl<T: ApplicationStore + SeatInventoryStore> CycleStore for T {}

// ----------------------------- In-memory store -----------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    applicants: Vec<ApplicantRecord>,
    index: HashMap<StudentId, usize>,
    seats: BTreeMap<BranchCode, SeatInventoryRecord>,
}

impl MemoryStore {
    pub fn new(applicants: Vec<ApplicantRecord>, seats: Vec<SeatInventoryRecord>) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(applicants.len());
        for (i, a) in applicants.iter().enumerate() {
            if index.insert(a.student_id.clone(), i).is_some() {
                return Err(StoreError::Duplicate(format!("student_id {}", a.student_id)));
            }
        }
        let mut by_branch = BTreeMap::new();
        for s in seats {
            let key = s.branch.clone();
            if by_branch.insert(key.clone(), s).is_some() {
                return Err(StoreError::Duplicate(format!("branch {key}")));
            }
        }
        Ok(MemoryStore { applicants, index, seats: by_branch })
    }

    /// Applicants in store order, seats in branch order.
    pub fn into_parts(self) -> (Vec<ApplicantRecord>, Vec<SeatInventoryRecord>) {
        (self.applicants, self.seats.into_values().collect())
    }

    pub fn applicants(&self) -> &[ApplicantRecord] {
        &self.applicants
    }

    pub fn seat(&self, branch: &BranchCode) -> Option<&SeatInventoryRecord> {
        self.seats.get(branch)
    }

    fn filter(&self, pred: impl Fn(&ApplicantRecord) -> bool) -> Vec<ApplicantRecord> {
        self.applicants.iter().filter(|a| pred(a)).cloned().collect()
    }
}

impl ApplicationStore for MemoryStore {
    fn by_status(&self, status: ApplicationStatus) -> Result<Vec<ApplicantRecord>, StoreError> {
        Ok(self.filter(|a| a.status == status))
    }

    fn by_response(&self, response: StudentResponse) -> Result<Vec<ApplicantRecord>, StoreError> {
        Ok(self.filter(|a| a.student_response == response))
    }

    fn get(&self, id: &StudentId) -> Result<ApplicantRecord, StoreError> {
        self.index
            .get(id)
            .map(|&i| self.applicants[i].clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(&mut self, record: &ApplicantRecord) -> Result<(), StoreError> {
        let i = *self
            .index
            .get(&record.student_id)
            .ok_or_else(|| StoreError::NotFound(record.student_id.clone()))?;
        self.applicants[i] = record.clone();
        Ok(())
    }

    fn all(&self) -> Result<Vec<ApplicantRecord>, StoreError> {
        Ok(self.applicants.clone())
    }
}

impl SeatInventoryStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<SeatInventoryRecord>, StoreError> {
        Ok(self.seats.values().cloned().collect())
    }

    fn try_reserve(&mut self, branch: &BranchCode) -> Result<bool, StoreError> {
        let s = self
            .seats
            .get_mut(branch)
            .ok_or_else(|| StoreError::UnknownBranch(branch.clone()))?;
        if s.available_seats == 0 {
            return Ok(false);
        }
        s.available_seats -= 1;
        Ok(true)
    }

    fn release(&mut self, branch: &BranchCode) -> Result<(), StoreError> {
        let s = self
            .seats
            .get_mut(branch)
            .ok_or_else(|| StoreError::UnknownBranch(branch.clone()))?;
        if s.available_seats >= s.total_seats {
            return Err(StoreError::SeatOverflow(branch.clone()));
        }
        s.available_seats += 1;
        Ok(())
    }
}
