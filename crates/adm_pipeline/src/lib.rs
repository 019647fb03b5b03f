//! adm_pipeline: admission cycle orchestration (merit → round 1 → responses → round N).
//!
//! This crate stays I/O-free: stores are traits (`store`), math lives in
//! `adm_algo`, hashing for round records comes from `adm_io`.
//!
//! One `AdmissionEngine` owns one cycle. Every operation takes the per-cycle
//! lock with `try_lock`; a second operation started while one is running gets
//! `PipelineError::CycleBusy` instead of waiting.

#![forbid(unsafe_code)]

use std::sync::{Mutex, MutexGuard, TryLockError};

use thiserror::Error;

use adm_core::audit::RoundRecord;
use adm_core::variables::validate_domains;
use adm_core::{ApplicationStatus, Category, Params, StudentId, StudentResponse};

pub mod allocate;
pub mod lifecycle;
pub mod merit;
pub mod record;
pub mod respond;
pub mod store;

pub use allocate::RoundOutcome;
pub use merit::MeritOutcome;
pub use respond::RespondOutcome;
pub use store::{ApplicationStore, CycleStore, MemoryStore, SeatInventoryStore, StoreError};

/// Single error surface for the engine.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad input; nothing was mutated.
    #[error("validation error: {0}")]
    Validation(String),
    /// Record or cycle in the wrong state; nothing was mutated.
    #[error("state error: {0}")]
    State(String),
    /// Store failure. Earlier writes of the same batch stay committed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("cycle busy: another operation holds the cycle lock")]
    CycleBusy,
    #[error("audit error: {0}")]
    Audit(String),
}

impl From<adm_io::IoError> for PipelineError {
    fn from(e: adm_io::IoError) -> Self {
        PipelineError::Audit(e.to_string())
    }
}

struct CycleState<S> {
    store: S,
    rounds: Vec<RoundRecord>,
}

pub struct AdmissionEngine<S> {
    params: Params,
    state: Mutex<CycleState<S>>,
}

impl<S: CycleStore> AdmissionEngine<S> {
    pub fn new(params: Params, store: S) -> Result<Self, PipelineError> {
        Self::with_rounds(params, store, Vec::new())
    }

    /// Resume a cycle that already has completed rounds.
    pub fn with_rounds(params: Params, store: S, rounds: Vec<RoundRecord>) -> Result<Self, PipelineError> {
        validate_domains(&params).map_err(|e| PipelineError::Validation(format!("params: {e}")))?;
        Ok(AdmissionEngine {
            params,
            state: Mutex::new(CycleState { store, rounds }),
        })
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    fn lock(&self) -> Result<MutexGuard<'_, CycleState<S>>, PipelineError> {
        match self.state.try_lock() {
            Ok(g) => Ok(g),
            Err(TryLockError::WouldBlock) => Err(PipelineError::CycleBusy),
            // A panic mid-operation leaves committed-so-far state, same as an error.
            Err(TryLockError::Poisoned(p)) => Ok(p.into_inner()),
        }
    }

    /// Rank every verified applicant.
    pub fn generate_merit(&self) -> Result<MeritOutcome, PipelineError> {
        let mut st = self.lock()?;
        merit::generate_merit(&mut st.store, &self.params)
    }

    /// Run allocation round `round` (1 = initial, ≥ 2 = reallocation).
    pub fn run_round(&self, round: u32) -> Result<RoundOutcome, PipelineError> {
        let mut st = self.lock()?;
        let CycleState { store, rounds } = &mut *st;
        allocate::run_round(store, rounds, &self.params, round)
    }

    pub fn respond(&self, id: &StudentId, response: StudentResponse) -> Result<RespondOutcome, PipelineError> {
        let mut st = self.lock()?;
        respond::respond(&mut st.store, id, response)
    }

    /// Administrative lifecycle step outside allocation.
    pub fn transition(&self, id: &StudentId, to: ApplicationStatus) -> Result<ApplicationStatus, PipelineError> {
        let mut st = self.lock()?;
        lifecycle::advance(&mut st.store, &self.params, id, to)
    }

    pub fn change_category(&self, id: &StudentId, category: Category) -> Result<(), PipelineError> {
        let mut st = self.lock()?;
        lifecycle::change_category(&mut st.store, id, category)
    }

    pub fn rounds(&self) -> Result<Vec<RoundRecord>, PipelineError> {
        Ok(self.lock()?.rounds.clone())
    }

    /// Hand back the store and round log (e.g. to persist them).
    pub fn into_parts(self) -> (S, Vec<RoundRecord>) {
        let st = self.state.into_inner().unwrap_or_else(|p| p.into_inner());
        (st.store, st.rounds)
    }
}
