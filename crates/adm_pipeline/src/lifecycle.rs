//! Administrative lifecycle steps outside allocation: submit, verify, request
//! correction, reject, documents verified, fee paid, admitted.
//!
//! `merit_generated` and `seat_allotted` belong to the merit and allocation
//! stages and are refused here.

use tracing::info;

use adm_core::status::transition;
use adm_core::{ApplicantRecord, ApplicationStatus, Category, Params, StudentId};

use crate::store::CycleStore;
use crate::PipelineError;

/// `<year><BRANCH><seq:03>`, seq counting admitted applicants of the branch.
pub fn register_number(year: u16, app: &ApplicantRecord, admitted_in_branch: usize) -> Option<String> {
    let branch = app.allotted_branch.as_ref()?;
    Some(format!("{year}{branch}{:03}", admitted_in_branch + 1))
}

pub fn advance<S: CycleStore>(
    store: &mut S,
    params: &Params,
    id: &StudentId,
    to: ApplicationStatus,
) -> Result<ApplicationStatus, PipelineError> {
    if matches!(to, ApplicationStatus::MeritGenerated | ApplicationStatus::SeatAllotted) {
        return Err(PipelineError::Validation(format!("status {to} is set by merit/allocation only")));
    }
    let mut app = store.get(id)?;
    let from = app.status;
    if from.is_terminal() {
        return Err(PipelineError::State(format!("{id}: status {from} is final")));
    }
    if to == ApplicationStatus::DocumentsVerified && !app.seat_locked {
        return Err(PipelineError::State(format!("{id}: documents_verified requires an accepted seat")));
    }
    app.status = transition(from, to).map_err(|e| PipelineError::State(format!("{id}: {e}")))?;

    if to == ApplicationStatus::Admitted {
        let admitted = store
            .by_status(ApplicationStatus::Admitted)?
            .iter()
            .filter(|a| a.allotted_branch == app.allotted_branch)
            .count();
        app.register_number = register_number(params.admission_year, &app, admitted);
    }

    store.save(&app)?;
    info!(student = %id, %from, %to, register_number = ?app.register_number, "status advanced");
    Ok(app.status)
}

pub fn change_category<S: CycleStore>(store: &mut S, id: &StudentId, category: Category) -> Result<(), PipelineError> {
    let mut app = store.get(id)?;
    app.set_category(category)
        .map_err(|e| PipelineError::State(format!("{id}: {e}")))?;
    store.save(&app)?;
    info!(student = %id, %category, "category changed");
    Ok(())
}
