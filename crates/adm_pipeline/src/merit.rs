//! MERIT stage: verified → merit_generated with a dense rank.
//!
//! The pool is queried in store order so input-order ties follow submission
//! order. Later cohorts (merit re-run after more verifications) are ranked
//! after the current maximum rank; existing ranks are never rewritten.

use tracing::{debug, info, warn};

use adm_algo::merit::rank_applicants;
use adm_core::rng::TieRng;
use adm_core::status::transition;
use adm_core::variables::MeritTiePolicy;
use adm_core::{ApplicantRecord, ApplicationStatus, Params};

use crate::store::CycleStore;
use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeritOutcome {
    pub ranked_count: u32,
    /// Rank given to the top of this cohort; `None` when nothing was ranked.
    pub first_rank: Option<u32>,
}

impl MeritOutcome {
    /// No verified applicants were found; nothing changed.
    pub fn is_noop(&self) -> bool {
        self.ranked_count == 0
    }
}

pub fn generate_merit<S: CycleStore>(store: &mut S, params: &Params) -> Result<MeritOutcome, PipelineError> {
    let pool = store.by_status(ApplicationStatus::Verified)?;
    if pool.is_empty() {
        warn!("generate_merit: no verified applicants");
        return Ok(MeritOutcome { ranked_count: 0, first_rank: None });
    }

    let max_rank = store.all()?.iter().filter_map(|a| a.rank).max().unwrap_or(0);
    if max_rank > 0 {
        warn!(max_rank, cohort = pool.len(), "merit already generated; ranking new cohort after existing ranks");
    }
    let first_rank = max_rank
        .checked_add(1)
        .ok_or_else(|| PipelineError::State("rank space exhausted".into()))?;

    let mut rng = match params.merit_tie_policy {
        MeritTiePolicy::InputOrder => None,
        MeritTiePolicy::Random => {
            let seed = params
                .tie_seed
                .ok_or_else(|| PipelineError::Validation("merit_tie_policy=random requires tie_seed".into()))?;
            Some(TieRng::from_seed_u64(seed))
        }
    };

    let refs: Vec<&ApplicantRecord> = pool.iter().collect();
    let ranked = rank_applicants(&refs, params, first_rank, rng.as_mut())
        .map_err(|e| PipelineError::Validation(e.to_string()))?;

    for entry in &ranked {
        let mut app = pool[entry.pool_index].clone();
        app.status = transition(app.status, ApplicationStatus::MeritGenerated)
            .map_err(|e| PipelineError::State(format!("{}: {e}", app.student_id)))?;
        app.rank = Some(entry.rank);
        store.save(&app)?;
        debug!(student = %app.student_id, rank = entry.rank, score = %entry.merit_score, "ranked");
    }

    let ranked_count = ranked.len() as u32;
    info!(ranked_count, first_rank, policy = params.merit_tie_policy.as_str(), "merit list generated");
    Ok(MeritOutcome { ranked_count, first_rank: Some(first_rank) })
}
