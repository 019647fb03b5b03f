//! RESPOND stage: a student's answer to their current offer.

use tracing::info;

use adm_algo::respond::{apply_response, ResponseEffect};
use adm_core::{BranchCode, StudentId, StudentResponse};

use crate::store::CycleStore;
use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondOutcome {
    pub ok: bool,
    /// Branch whose seat went back to the inventory (REJECTED only).
    pub released_branch: Option<BranchCode>,
}

pub fn respond<S: CycleStore>(
    store: &mut S,
    id: &StudentId,
    response: StudentResponse,
) -> Result<RespondOutcome, PipelineError> {
    if response == StudentResponse::Pending {
        return Err(PipelineError::Validation(
            "response must be ACCEPTED, REJECTED or UPGRADE_REQUESTED".into(),
        ));
    }
    let mut app = store.get(id)?;
    let effect = apply_response(&mut app, response).map_err(|e| {
        if e.is_validation() {
            PipelineError::Validation(format!("{id}: {e}"))
        } else {
            PipelineError::State(format!("{id}: {e}"))
        }
    })?;
    store.save(&app)?;

    let released_branch = match effect {
        ResponseEffect::Released(branch) => {
            store.release(&branch)?;
            Some(branch)
        }
        ResponseEffect::Locked(_) | ResponseEffect::Kept(_) => None,
    };
    info!(student = %id, response = response.as_str(), released = ?released_branch, "response recorded");
    Ok(RespondOutcome { ok: true, released_branch })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ApplicationStore, MemoryStore, SeatInventoryStore};
    use adm_core::{ApplicantRecord, ApplicationStatus, Category, Percentage, SeatInventoryRecord};

    fn b(s: &str) -> BranchCode {
        s.parse().unwrap()
    }

    fn allotted_store() -> MemoryStore {
        let mut a = ApplicantRecord::new(
            "S1".parse().unwrap(),
            Category::General,
            Percentage::from_points(90).unwrap(),
            vec![b("CSE")],
        )
        .with_status(ApplicationStatus::SeatAllotted);
        a.rank = Some(1);
        a.allotted_branch = Some(b("CSE"));
        a.round = Some(1);
        let mut s = MemoryStore::new(vec![a], vec![SeatInventoryRecord::new(b("CSE"), 1)]).unwrap();
        assert!(s.try_reserve(&b("CSE")).unwrap());
        s
    }

    #[test]
    fn reject_returns_seat_to_inventory() {
        let mut s = allotted_store();
        let id: StudentId = "S1".parse().unwrap();
        let out = respond(&mut s, &id, StudentResponse::Rejected).unwrap();
        assert_eq!(out, RespondOutcome { ok: true, released_branch: Some(b("CSE")) });
        assert_eq!(s.seat(&b("CSE")).unwrap().available_seats, 1);
    }

    #[test]
    fn pending_is_validation_and_mutates_nothing() {
        let mut s = allotted_store();
        let id: StudentId = "S1".parse().unwrap();
        let before = s.get(&id).unwrap();
        assert!(matches!(respond(&mut s, &id, StudentResponse::Pending), Err(PipelineError::Validation(_))));
        assert_eq!(s.get(&id).unwrap(), before);
    }

    #[test]
    fn second_response_is_a_state_error() {
        let mut s = allotted_store();
        let id: StudentId = "S1".parse().unwrap();
        respond(&mut s, &id, StudentResponse::Accepted).unwrap();
        assert!(matches!(respond(&mut s, &id, StudentResponse::Rejected), Err(PipelineError::State(_))));
        assert_eq!(s.seat(&b("CSE")).unwrap().available_seats, 0);
    }

    #[test]
    fn unknown_student_is_a_store_error() {
        let mut s = allotted_store();
        let err = respond(&mut s, &"NOPE".parse().unwrap(), StudentResponse::Accepted).unwrap_err();
        assert!(matches!(err, PipelineError::Store(crate::StoreError::NotFound(_))));
    }
}
