//! Cycle snapshot: the whole state of one admission cycle in one document.
//!
//! Applicant order is store (submission) order and is preserved verbatim;
//! seats are kept in branch order; rounds are append-only.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use adm_core::audit::RoundRecord;
use adm_core::{ApplicantRecord, Params, SeatInventoryRecord};

use crate::canonical_json::write_canonical_file;
use crate::loader::LoadedCycle;
use crate::validate::validate_cycle;
use crate::IoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleSnapshot {
    pub admission_year: u16,
    pub params: Params,
    pub applicants: Vec<ApplicantRecord>,
    pub seats: Vec<SeatInventoryRecord>,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

impl CycleSnapshot {
    pub fn new(params: Params, applicants: Vec<ApplicantRecord>, mut seats: Vec<SeatInventoryRecord>) -> Self {
        seats.sort_by(|a, b| a.branch.cmp(&b.branch));
        CycleSnapshot {
            admission_year: params.admission_year,
            params,
            applicants,
            seats,
            rounds: Vec::new(),
        }
    }

    /// Highest completed round, 0 before any round ran.
    pub fn last_round(&self) -> u32 {
        self.rounds.iter().map(|r| r.round).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), IoError> {
        if self.admission_year != self.params.admission_year {
            return Err(IoError::Invalid(format!(
                "admission_year {} does not match params.admission_year {}",
                self.admission_year, self.params.admission_year
            )));
        }
        validate_cycle(&self.params, &self.applicants, &self.seats)
    }
}

impl From<LoadedCycle> for CycleSnapshot {
    fn from(c: LoadedCycle) -> Self {
        CycleSnapshot::new(c.params, c.applicants, c.seats)
    }
}

pub fn read_snapshot(path: &Path) -> Result<CycleSnapshot, IoError> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let snap: CycleSnapshot = serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: path.display().to_string(),
        msg: e.to_string(),
    })?;
    snap.validate()?;
    Ok(snap)
}

/// Canonical, atomic write.
pub fn write_snapshot(path: &Path, snap: &CycleSnapshot) -> Result<(), IoError> {
    write_canonical_file(path, snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adm_core::{ApplicationStatus, BranchCode, Category, Percentage};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    fn b(s: &str) -> BranchCode {
        s.parse().unwrap()
    }

    fn snap() -> CycleSnapshot {
        let a = ApplicantRecord::new(
            "S1".parse().unwrap(),
            Category::Ews,
            Percentage::from_f64(77.25).unwrap(),
            vec![b("ME"), b("CSE")],
        )
        .with_status(ApplicationStatus::Verified);
        CycleSnapshot::new(
            Params::default(),
            vec![a],
            vec![SeatInventoryRecord::new(b("ME"), 1), SeatInventoryRecord::new(b("CSE"), 2)],
        )
    }

    #[test]
    fn write_then_read_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("state.json");
        let s = snap();
        write_snapshot(&p, &s).unwrap();
        let back = read_snapshot(&p).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.last_round(), 0);
    }

    #[test]
    fn seats_sorted_and_serialized_shape() {
        let s = snap();
        assert_eq!(s.seats[0].branch, b("CSE"));
        let v = serde_json::to_value(&s).unwrap();
        assert_json_include!(
            actual: v,
            expected: json!({
                "admission_year": 2026,
                "applicants": [{"student_id": "S1", "category": "ews", "base_percentage": 77.25,
                                "status": "verified", "student_response": "PENDING", "seat_locked": false}],
                "seats": [{"branch": "CSE", "total_seats": 2, "available_seats": 2}],
                "rounds": []
            })
        );
    }

    #[test]
    fn year_mismatch_is_invalid() {
        let mut s = snap();
        s.admission_year = 2020;
        assert!(matches!(s.validate(), Err(IoError::Invalid(_))));
    }
}
