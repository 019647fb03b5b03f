//! Student response to a pending offer.
//!
//! One response per offer. The record is only touched once every precondition
//! holds, so a refused response leaves it exactly as it was.

use core::fmt;

use adm_core::status::transition;
use adm_core::{ApplicantRecord, ApplicationStatus, BranchCode, CoreError, StudentResponse};

/// What the caller must do with the seat inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseEffect {
    /// Seat accepted and locked; inventory unchanged.
    Locked(BranchCode),
    /// Seat given back; the caller releases one seat of this branch.
    Released(BranchCode),
    /// Upgrade requested; the seat stays held.
    Kept(BranchCode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseError {
    /// `PENDING` is not a response.
    MissingResponse,
    SeatLocked,
    WrongStatus(ApplicationStatus),
    NotAllotted,
    AlreadyResponded(StudentResponse),
    Transition(CoreError),
}

impl ResponseError {
    /// Bad input rather than a record in the wrong state.
    pub fn is_validation(&self) -> bool {
        matches!(self, ResponseError::MissingResponse)
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseError::MissingResponse => {
                write!(f, "response must be ACCEPTED, REJECTED or UPGRADE_REQUESTED")
            }
            ResponseError::SeatLocked => write!(f, "seat already locked"),
            ResponseError::WrongStatus(s) => write!(f, "no open offer in status {s}"),
            ResponseError::NotAllotted => write!(f, "no allotted branch"),
            ResponseError::AlreadyResponded(r) => write!(f, "offer already answered ({r})"),
            ResponseError::Transition(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ResponseError {}

impl From<CoreError> for ResponseError {
    fn from(e: CoreError) -> Self {
        ResponseError::Transition(e)
    }
}

pub fn apply_response(app: &mut ApplicantRecord, response: StudentResponse) -> Result<ResponseEffect, ResponseError> {
    if response == StudentResponse::Pending {
        return Err(ResponseError::MissingResponse);
    }
    if app.seat_locked {
        return Err(ResponseError::SeatLocked);
    }

    // Waiting on an upgrade while still holding a seat: accepting the held
    // seat withdraws the upgrade request.
    if app.status == ApplicationStatus::MeritGenerated
        && app.student_response == StudentResponse::UpgradeRequested
        && response == StudentResponse::Accepted
    {
        let held = app.allotted_branch.clone().ok_or(ResponseError::NotAllotted)?;
        app.status = transition(app.status, ApplicationStatus::SeatAllotted)?;
        app.student_response = StudentResponse::Accepted;
        app.seat_locked = true;
        return Ok(ResponseEffect::Locked(held));
    }

    if app.status != ApplicationStatus::SeatAllotted {
        return Err(ResponseError::WrongStatus(app.status));
    }
    let branch = app.allotted_branch.clone().ok_or(ResponseError::NotAllotted)?;
    if app.student_response != StudentResponse::Pending {
        return Err(ResponseError::AlreadyResponded(app.student_response));
    }

    match response {
        StudentResponse::Accepted => {
            app.student_response = StudentResponse::Accepted;
            app.seat_locked = true;
            Ok(ResponseEffect::Locked(branch))
        }
        StudentResponse::Rejected => {
            app.status = transition(app.status, ApplicationStatus::MeritGenerated)?;
            app.student_response = StudentResponse::Rejected;
            app.allotted_branch = None;
            app.round = None;
            // Later rounds resume after the refused branch.
            app.previous_allotted_branch = Some(branch.clone());
            Ok(ResponseEffect::Released(branch))
        }
        StudentResponse::UpgradeRequested => {
            app.status = transition(app.status, ApplicationStatus::MeritGenerated)?;
            app.student_response = StudentResponse::UpgradeRequested;
            Ok(ResponseEffect::Kept(branch))
        }
        StudentResponse::Pending => Err(ResponseError::MissingResponse),
    }
}
