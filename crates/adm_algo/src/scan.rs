//! Preference scan for one applicant in one round.
//!
//! Round 1 scans the whole preference list. Later rounds resume strictly after
//! `previous_allotted_branch`. Under `strictly_better`, an applicant holding a
//! seat while waiting on an upgrade only scans up to (not including) the held
//! branch. The held branch itself is always skipped.

use adm_core::status::transition;
use adm_core::variables::UpgradePolicy;
use adm_core::{ApplicantRecord, ApplicationStatus, BranchCode, CoreError, StudentResponse};

use crate::ledger::SeatLedger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundKind {
    Initial,
    Reallocation,
}

impl RoundKind {
    /// Round 1 is the initial round; every later round reallocates.
    #[inline]
    pub fn for_round(round: u32) -> Self {
        if round <= 1 {
            RoundKind::Initial
        } else {
            RoundKind::Reallocation
        }
    }
}

/// Half-open range of preference indices `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanWindow {
    pub start: usize,
    pub end: usize,
}

impl ScanWindow {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    pub branch: BranchCode,
    /// Index into `branch_preferences`.
    pub index: usize,
}

/// Whether `app` belongs to the pool of a round of `kind`.
pub fn is_eligible(app: &ApplicantRecord, kind: RoundKind) -> bool {
    if app.seat_locked || app.rank.is_none() {
        return false;
    }
    if !app.status.can_transition(ApplicationStatus::SeatAllotted) {
        return false;
    }
    match kind {
        RoundKind::Initial => app.status == ApplicationStatus::MeritGenerated,
        RoundKind::Reallocation => {
            app.status == ApplicationStatus::MeritGenerated
                || app.student_response == StudentResponse::UpgradeRequested
        }
    }
}

pub fn scan_window(app: &ApplicantRecord, kind: RoundKind, policy: UpgradePolicy) -> ScanWindow {
    let len = app.branch_preferences.len();
    let start = match kind {
        RoundKind::Initial => 0,
        RoundKind::Reallocation => app.resume_index().min(len),
    };
    let mut end = len;
    if kind == RoundKind::Reallocation
        && policy == UpgradePolicy::StrictlyBetter
        && app.student_response == StudentResponse::UpgradeRequested
    {
        if let Some(held) = app.allotted_branch.as_ref().and_then(|b| app.preference_index(b)) {
            end = held.max(start);
        }
    }
    ScanWindow { start, end }
}

/// First open branch inside `window`, skipping the branch currently held.
pub fn first_fit(app: &ApplicantRecord, window: ScanWindow, ledger: &SeatLedger) -> Option<Offer> {
    if window.is_empty() {
        return None;
    }
    let held = app.allotted_branch.as_ref();
    app.branch_preferences[window.start..window.end]
        .iter()
        .enumerate()
        .find(|(_, b)| Some(*b) != held && ledger.has_open(b))
        .map(|(i, b)| Offer { branch: b.clone(), index: window.start + i })
}

/// Record an offer on the applicant. Returns the branch it vacates, if any.
///
/// The caller owns the seat bookkeeping: the offered seat must already be
/// reserved, and the vacated seat is released (or not) by policy.
pub fn apply_offer(app: &mut ApplicantRecord, offer: &Offer, round: u32) -> Result<Option<BranchCode>, CoreError> {
    app.status = transition(app.status, ApplicationStatus::SeatAllotted)?;
    let vacated = app.allotted_branch.replace(offer.branch.clone());
    if let Some(old) = &vacated {
        app.previous_allotted_branch = Some(old.clone());
    }
    app.round = Some(round);
    app.student_response = StudentResponse::Pending;
    Ok(vacated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adm_core::{Category, Percentage, SeatInventoryRecord};

    fn b(s: &str) -> BranchCode {
        s.parse().unwrap()
    }

    fn ranked(prefs: &[&str]) -> ApplicantRecord {
        let mut a = ApplicantRecord::new(
            "S1".parse().unwrap(),
            Category::General,
            Percentage::from_points(70).unwrap(),
            prefs.iter().map(|p| b(p)).collect(),
        )
        .with_status(ApplicationStatus::MeritGenerated);
        a.rank = Some(1);
        a
    }

    fn ledger(seats: &[(&str, u32)]) -> SeatLedger {
        let recs: Vec<_> = seats.iter().map(|(n, s)| SeatInventoryRecord::new(b(n), *s)).collect();
        SeatLedger::from_records(&recs).unwrap()
    }

    #[test]
    fn first_fit_takes_earliest_open_branch() {
        let a = ranked(&["CSE", "ECE", "ME"]);
        let l = ledger(&[("CSE", 0), ("ECE", 1), ("ME", 1)]);
        let w = scan_window(&a, RoundKind::Initial, UpgradePolicy::ForwardScan);
        assert_eq!(first_fit(&a, w, &l), Some(Offer { branch: b("ECE"), index: 1 }));
    }

    #[test]
    fn reallocation_resumes_after_previous() {
        let mut a = ranked(&["CSE", "ECE", "ME"]);
        a.previous_allotted_branch = Some(b("CSE"));
        let l = ledger(&[("CSE", 1), ("ECE", 0), ("ME", 1)]);
        let w = scan_window(&a, RoundKind::Reallocation, UpgradePolicy::ForwardScan);
        assert_eq!(w, ScanWindow { start: 1, end: 3 });
        assert_eq!(first_fit(&a, w, &l).map(|o| o.index), Some(2));
    }

    #[test]
    fn initial_round_ignores_previous() {
        let mut a = ranked(&["CSE", "ECE"]);
        a.previous_allotted_branch = Some(b("CSE"));
        let w = scan_window(&a, RoundKind::Initial, UpgradePolicy::ForwardScan);
        assert_eq!(w.start, 0);
    }

    #[test]
    fn held_branch_is_skipped() {
        let mut a = ranked(&["CSE", "ECE"]);
        a.allotted_branch = Some(b("CSE"));
        a.student_response = StudentResponse::UpgradeRequested;
        let l = ledger(&[("CSE", 5), ("ECE", 0)]);
        let w = scan_window(&a, RoundKind::Reallocation, UpgradePolicy::ForwardScan);
        assert_eq!(first_fit(&a, w, &l), None);
    }

    #[test]
    fn strictly_better_stops_before_held_branch() {
        let mut a = ranked(&["CSE", "ECE", "ME"]);
        a.allotted_branch = Some(b("ECE"));
        a.student_response = StudentResponse::UpgradeRequested;
        let l = ledger(&[("CSE", 0), ("ECE", 1), ("ME", 1)]);
        let fwd = scan_window(&a, RoundKind::Reallocation, UpgradePolicy::ForwardScan);
        let strict = scan_window(&a, RoundKind::Reallocation, UpgradePolicy::StrictlyBetter);
        assert_eq!(strict, ScanWindow { start: 0, end: 1 });
        assert_eq!(first_fit(&a, strict, &l), None);
        assert_eq!(first_fit(&a, fwd, &l).map(|o| o.branch), Some(b("ME")));
    }

    #[test]
    fn eligibility_rules() {
        let mut a = ranked(&["CSE"]);
        assert!(is_eligible(&a, RoundKind::Initial));
        a.seat_locked = true;
        assert!(!is_eligible(&a, RoundKind::Reallocation));
        a.seat_locked = false;
        a.rank = None;
        assert!(!is_eligible(&a, RoundKind::Initial));
        a.rank = Some(3);
        a.status = ApplicationStatus::SeatAllotted;
        assert!(!is_eligible(&a, RoundKind::Initial));
        a.status = ApplicationStatus::Verified;
        assert!(!is_eligible(&a, RoundKind::Reallocation));
    }

    #[test]
    fn apply_offer_moves_current_into_previous() {
        let mut a = ranked(&["CSE", "ECE"]);
        a.allotted_branch = Some(b("ECE"));
        a.student_response = StudentResponse::UpgradeRequested;
        let offer = Offer { branch: b("CSE"), index: 0 };
        let vacated = apply_offer(&mut a, &offer, 2).unwrap();
        assert_eq!(vacated, Some(b("ECE")));
        assert_eq!(a.previous_allotted_branch, Some(b("ECE")));
        assert_eq!(a.allotted_branch, Some(b("CSE")));
        assert_eq!(a.round, Some(2));
        assert_eq!(a.status, ApplicationStatus::SeatAllotted);
        assert_eq!(a.student_response, StudentResponse::Pending);
    }

    #[test]
    fn apply_offer_refuses_wrong_status() {
        let mut a = ranked(&["CSE"]).with_status(ApplicationStatus::Admitted);
        let offer = Offer { branch: b("CSE"), index: 0 };
        assert!(apply_offer(&mut a, &offer, 1).is_err());
        assert_eq!(a.allotted_branch, None);
    }
}
