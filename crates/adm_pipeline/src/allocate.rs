//! ALLOCATE stage: one allocation round over the eligible pool.
//!
//! - Inventory is loaded once into a `SeatLedger`; the ledger answers every
//!   availability check during the scan.
//! - Applicants are processed strictly one at a time in ascending rank. Each
//!   assignment is reserved in the store (decrement-if-positive) and saved
//!   before the next applicant is looked at.
//! - A failure mid-round returns immediately. Assignments already made stay
//!   committed and no round record is appended.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use adm_algo::scan::{apply_offer, first_fit, is_eligible, scan_window, RoundKind};
use adm_algo::SeatLedger;
use adm_core::audit::{Allotment, RoundRecord};
use adm_core::{ApplicantRecord, ApplicationStatus, Params, StudentId, StudentResponse};

use crate::record::{build_round_record, inventory_digest, RoundTally};
use crate::store::CycleStore;
use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u32,
    pub allocated_count: u32,
    pub considered_count: u32,
    pub released_count: u32,
    /// Eligible applicants left without a new offer, in rank order.
    pub unallotted: Vec<StudentId>,
    pub record_id: String,
}

/// Round numbers start at 1 and must move past the last completed round.
fn check_round_number(round: u32, rounds: &[RoundRecord]) -> Result<(), PipelineError> {
    if round == 0 {
        return Err(PipelineError::Validation("round number must be at least 1".into()));
    }
    let last = rounds.iter().map(|r| r.round).max().unwrap_or(0);
    if round <= last {
        return Err(PipelineError::State(format!(
            "round {round} is not after the last completed round {last}"
        )));
    }
    Ok(())
}

fn eligible_pool<S: CycleStore>(store: &S, kind: RoundKind) -> Result<Vec<ApplicantRecord>, PipelineError> {
    let mut pool = store.by_status(ApplicationStatus::MeritGenerated)?;
    if kind == RoundKind::Reallocation {
        let seen: BTreeSet<StudentId> = pool.iter().map(|a| a.student_id.clone()).collect();
        pool.extend(
            store
                .by_response(StudentResponse::UpgradeRequested)?
                .into_iter()
                .filter(|a| !seen.contains(&a.student_id)),
        );
    }
    pool.retain(|a| is_eligible(a, kind));
    pool.sort_by_key(|a| a.rank);
    Ok(pool)
}

pub fn run_round<S: CycleStore>(
    store: &mut S,
    rounds: &mut Vec<RoundRecord>,
    params: &Params,
    round: u32,
) -> Result<RoundOutcome, PipelineError> {
    check_round_number(round, rounds)?;
    let kind = RoundKind::for_round(round);

    let mut ledger = SeatLedger::from_records(&store.load_all()?)
        .map_err(|e| PipelineError::Validation(format!("seat inventory: {e}")))?;
    let before_sha256 = inventory_digest(&ledger.to_records())?;

    let pool = eligible_pool(store, kind)?;
    info!(round, ?kind, pool = pool.len(), open_seats = ledger.total_available(), "allocation round started");

    let mut tally = RoundTally { considered: pool.len() as u32, ..RoundTally::default() };
    let mut unallotted = Vec::new();

    for mut app in pool {
        let window = scan_window(&app, kind, params.upgrade_policy);
        let offer = loop {
            let Some(offer) = first_fit(&app, window, &ledger) else { break None };
            if store.try_reserve(&offer.branch)? {
                break Some(offer);
            }
            // The store is authoritative; stop offering a branch it reports full.
            warn!(branch = %offer.branch, "store refused reservation; branch marked exhausted");
            ledger.mark_exhausted(&offer.branch);
        };

        let Some(offer) = offer else {
            debug!(student = %app.student_id, rank = ?app.rank, "no eligible preference");
            unallotted.push(app.student_id.clone());
            continue;
        };

        ledger
            .try_reserve(&offer.branch)
            .map_err(|e| PipelineError::State(format!("ledger: {e}")))?;
        let vacated = apply_offer(&mut app, &offer, round)
            .map_err(|e| PipelineError::State(format!("{}: {e}", app.student_id)))?;
        store.save(&app)?;

        if let Some(old) = &vacated {
            if params.release_on_reallocation {
                store.release(old)?;
                ledger
                    .release(old)
                    .map_err(|e| PipelineError::State(format!("ledger: {e}")))?;
                tally.released += 1;
            } else {
                debug!(student = %app.student_id, branch = %old, "vacated seat kept consumed");
            }
        }

        debug!(
            student = %app.student_id,
            rank = ?app.rank,
            branch = %offer.branch,
            preference = offer.index,
            "allotted"
        );
        tally.allotments.push(Allotment {
            student_id: app.student_id.clone(),
            rank: app.rank.unwrap_or_default(),
            branch: offer.branch,
            preference_index: offer.index,
            vacated,
        });
    }

    let record = build_round_record(round, before_sha256, &ledger.to_records(), tally)?;
    let outcome = RoundOutcome {
        round,
        allocated_count: record.allocated,
        considered_count: record.considered,
        released_count: record.released,
        unallotted,
        record_id: record.id.clone(),
    };
    info!(
        round,
        allocated = outcome.allocated_count,
        released = outcome.released_count,
        unallotted = outcome.unallotted.len(),
        id = %outcome.record_id,
        "allocation round complete"
    );
    rounds.push(record);
    Ok(outcome)
}
