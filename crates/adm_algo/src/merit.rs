//! Merit scoring and rank assignment.
//!
//! Contract:
//! - `merit_score = base_percentage + category_bonus(category)` (hundredths, exact).
//! - Sort key: merit score ↓, then either input position (stable) or a seeded
//!   lottery key ↑ followed by input position.
//! - Ranks are consecutive from `first_rank`; every entry gets a distinct rank.
//!
//! No RNG is created here: with `merit_tie_policy = random` the caller supplies
//! a `TieRng` seeded from `Params::tie_seed`.

use core::fmt;

use adm_core::rng::TieRng;
use adm_core::variables::MeritTiePolicy;
use adm_core::{ApplicantRecord, MeritScore, Params, StudentId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedEntry {
    /// Position of the applicant in the input slice.
    pub pool_index: usize,
    pub student_id: StudentId,
    pub merit_score: MeritScore,
    pub rank: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeritError {
    /// `merit_tie_policy = random` without an RNG.
    MissingTieRng,
    /// Ranks start at 1.
    InvalidFirstRank,
    RankOverflow,
}

impl fmt::Display for MeritError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeritError::MissingTieRng => write!(f, "random tie policy requires a seeded tie RNG"),
            MeritError::InvalidFirstRank => write!(f, "first rank must be at least 1"),
            MeritError::RankOverflow => write!(f, "rank exceeds u32 range"),
        }
    }
}

impl std::error::Error for MeritError {}

#[inline]
pub fn merit_score(app: &ApplicantRecord, params: &Params) -> MeritScore {
    MeritScore::new(app.base_percentage, params.bonus_for(app.category()))
}

/// Rank `pool` in merit order. The returned vector is sorted by rank.
pub fn rank_applicants(
    pool: &[&ApplicantRecord],
    params: &Params,
    first_rank: u32,
    rng: Option<&mut TieRng>,
) -> Result<Vec<RankedEntry>, MeritError> {
    if first_rank == 0 {
        return Err(MeritError::InvalidFirstRank);
    }
    let last = u32::try_from(pool.len())
        .ok()
        .and_then(|n| first_rank.checked_add(n.saturating_sub(1)));
    if last.is_none() {
        return Err(MeritError::RankOverflow);
    }

    // (score, lottery, index); lottery is 0 under input-order policy.
    let mut keyed: Vec<(MeritScore, u64, usize)> = match params.merit_tie_policy {
        MeritTiePolicy::InputOrder => pool
            .iter()
            .enumerate()
            .map(|(i, a)| (merit_score(a, params), 0, i))
            .collect(),
        MeritTiePolicy::Random => {
            let rng = rng.ok_or(MeritError::MissingTieRng)?;
            // Keys are drawn in input order so the stream is reproducible.
            pool.iter()
                .enumerate()
                .map(|(i, a)| (merit_score(a, params), rng.next_key(), i))
                .collect()
        }
    };

    keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    Ok(keyed
        .into_iter()
        .enumerate()
        .map(|(pos, (score, _, idx))| RankedEntry {
            pool_index: idx,
            student_id: pool[idx].student_id.clone(),
            merit_score: score,
            // Bounded by the overflow check above.
            rank: first_rank + pos as u32,
        })
        .collect())
}
