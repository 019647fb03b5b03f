//! Cross-record checks run whenever a cycle enters the engine.

use std::collections::{BTreeMap, BTreeSet};

use adm_core::variables::validate_domains;
use adm_core::{ApplicantRecord, BranchCode, Params, SeatInventoryRecord};

use crate::IoError;

pub fn validate_cycle(
    params: &Params,
    applicants: &[ApplicantRecord],
    seats: &[SeatInventoryRecord],
) -> Result<(), IoError> {
    validate_domains(params).map_err(|e| IoError::Invalid(format!("params: {e}")))?;

    let mut branches: BTreeSet<&BranchCode> = BTreeSet::new();
    for s in seats {
        s.validate().map_err(|e| IoError::Invalid(format!("seats[{}]: {e}", s.branch)))?;
        if !branches.insert(&s.branch) {
            return Err(IoError::Invalid(format!("duplicate seat inventory for branch {}", s.branch)));
        }
    }

    let mut ids = BTreeSet::new();
    let mut ranks: BTreeMap<u32, &str> = BTreeMap::new();
    for (i, a) in applicants.iter().enumerate() {
        let at = |msg: String| IoError::Invalid(format!("applicants[{i}] ({}): {msg}", a.student_id));
        if !ids.insert(&a.student_id) {
            return Err(at("duplicate student_id".into()));
        }
        a.validate_preferences(params.max_preferences()).map_err(|e| at(e.to_string()))?;
        if let Some(b) = a.branch_preferences.iter().find(|b| !branches.contains(b)) {
            return Err(at(format!("preference {b} has no seat inventory")));
        }
        if let Some(b) = &a.allotted_branch {
            if !branches.contains(b) {
                return Err(at(format!("allotted branch {b} has no seat inventory")));
            }
        }
        if let Some(r) = a.rank {
            if r == 0 {
                return Err(at("rank must be positive".into()));
            }
            if let Some(other) = ranks.insert(r, a.student_id.as_str()) {
                return Err(at(format!("rank {r} already held by {other}")));
            }
        }
        if a.seat_locked && a.allotted_branch.is_none() {
            return Err(at("seat_locked without an allotted branch".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adm_core::{Category, Percentage};

    fn b(s: &str) -> BranchCode {
        s.parse().unwrap()
    }

    fn app(id: &str, prefs: &[&str]) -> ApplicantRecord {
        ApplicantRecord::new(
            id.parse().unwrap(),
            Category::General,
            Percentage::from_points(50).unwrap(),
            prefs.iter().map(|p| b(p)).collect(),
        )
    }

    fn seats() -> Vec<SeatInventoryRecord> {
        vec![SeatInventoryRecord::new(b("CSE"), 2), SeatInventoryRecord::new(b("ECE"), 1)]
    }

    #[test]
    fn accepts_a_clean_cycle() {
        let apps = [app("A", &["CSE", "ECE"]), app("B", &["ECE"])];
        assert!(validate_cycle(&Params::default(), &apps, &seats()).is_ok());
    }

    #[test]
    fn rejects_unknown_branch_and_duplicate_ids() {
        let p = Params::default();
        let e = validate_cycle(&p, &[app("A", &["ME"])], &seats()).unwrap_err();
        assert!(e.to_string().contains("ME"));
        let e = validate_cycle(&p, &[app("A", &["CSE"]), app("A", &["ECE"])], &seats()).unwrap_err();
        assert!(e.to_string().contains("duplicate student_id"));
    }

    #[test]
    fn rejects_bad_inventory() {
        let mut s = seats();
        s.push(SeatInventoryRecord::new(b("CSE"), 4));
        assert!(validate_cycle(&Params::default(), &[], &s).is_err());
        let over = [SeatInventoryRecord { branch: b("ME"), total_seats: 1, available_seats: 3 }];
        assert!(validate_cycle(&Params::default(), &[], &over).is_err());
    }

    #[test]
    fn rejects_duplicate_ranks() {
        let mut a = app("A", &["CSE"]);
        let mut c = app("C", &["CSE"]);
        a.rank = Some(1);
        c.rank = Some(1);
        let e = validate_cycle(&Params::default(), &[a, c], &seats()).unwrap_err();
        assert!(e.to_string().contains("rank 1"));
    }

    #[test]
    fn rejects_too_many_preferences() {
        let p = Params { max_preferences: 1, ..Params::default() };
        assert!(validate_cycle(&p, &[app("A", &["CSE", "ECE"])], &seats()).is_err());
    }
}
