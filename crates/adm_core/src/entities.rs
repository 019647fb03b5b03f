//! Applicant and seat-inventory records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{BranchCode, StudentId};
use crate::percent::Percentage;
use crate::status::{ApplicationStatus, StudentResponse};

/// Reservation categories (wire tokens are lowercase).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Obc,
    Sc,
    St,
    Ews,
}

impl Category {
    pub const ALL: [Category; 5] = [Category::General, Category::Obc, Category::Sc, Category::St, Category::Ews];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Obc => "obc",
            Category::Sc => "sc",
            Category::St => "st",
            Category::Ews => "ews",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Category {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == norm)
            .ok_or(CoreError::UnknownToken("category"))
    }
}

/// One applicant per admission cycle. Never deleted; it is the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub student_id: StudentId,
    category: Category,
    pub base_percentage: Percentage,
    pub branch_preferences: Vec<BranchCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allotted_branch: Option<BranchCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_allotted_branch: Option<BranchCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default)]
    pub student_response: StudentResponse,
    #[serde(default)]
    pub seat_locked: bool,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_number: Option<String>,
}

impl ApplicantRecord {
    /// A fresh draft application.
    pub fn new(
        student_id: StudentId,
        category: Category,
        base_percentage: Percentage,
        branch_preferences: Vec<BranchCode>,
    ) -> Self {
        ApplicantRecord {
            student_id,
            category,
            base_percentage,
            branch_preferences,
            rank: None,
            allotted_branch: None,
            previous_allotted_branch: None,
            round: None,
            student_response: StudentResponse::Pending,
            seat_locked: false,
            status: ApplicationStatus::Draft,
            register_number: None,
        }
    }

    /// Builder-style status override (fixtures, loaders).
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Category may change only before verification completes.
    pub fn set_category(&mut self, category: Category) -> Result<(), CoreError> {
        if self.status.is_past_verification() {
            return Err(CoreError::CategoryFrozen);
        }
        self.category = category;
        Ok(())
    }

    pub fn preference_index(&self, branch: &BranchCode) -> Option<usize> {
        self.branch_preferences.iter().position(|b| b == branch)
    }

    /// First preference index a reallocation scan may consider: strictly after
    /// `previous_allotted_branch`, or 0 when there is none.
    pub fn resume_index(&self) -> usize {
        self.previous_allotted_branch
            .as_ref()
            .and_then(|b| self.preference_index(b))
            .map_or(0, |i| i + 1)
    }

    /// 1..=max entries, no duplicates.
    pub fn validate_preferences(&self, max: usize) -> Result<(), CoreError> {
        let n = self.branch_preferences.len();
        if n == 0 {
            return Err(CoreError::EmptyPreferences);
        }
        if n > max {
            return Err(CoreError::TooManyPreferences { max, got: n });
        }
        let mut seen = BTreeSet::new();
        if !self.branch_preferences.iter().all(|b| seen.insert(b)) {
            return Err(CoreError::DuplicatePreference);
        }
        Ok(())
    }
}

/// One per branch per admission cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInventoryRecord {
    pub branch: BranchCode,
    pub total_seats: u32,
    pub available_seats: u32,
}

impl SeatInventoryRecord {
    /// Fully open branch.
    pub fn new(branch: BranchCode, total_seats: u32) -> Self {
        SeatInventoryRecord { branch, total_seats, available_seats: total_seats }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.available_seats > self.total_seats {
            return Err(CoreError::DomainOutOfRange("available_seats"));
        }
        Ok(())
    }

    #[inline]
    pub fn filled(&self) -> u32 {
        self.total_seats.saturating_sub(self.available_seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> BranchCode {
        s.parse().unwrap()
    }

    fn rec(prefs: &[&str]) -> ApplicantRecord {
        ApplicantRecord::new(
            "S1".parse().unwrap(),
            Category::General,
            Percentage::from_points(80).unwrap(),
            prefs.iter().map(|p| b(p)).collect(),
        )
    }

    #[test]
    fn resume_index_follows_previous() {
        let mut r = rec(&["CSE", "ECE", "ME"]);
        assert_eq!(r.resume_index(), 0);
        r.previous_allotted_branch = Some(b("ECE"));
        assert_eq!(r.resume_index(), 2);
        r.previous_allotted_branch = Some(b("ME"));
        assert_eq!(r.resume_index(), 3);
    }

    #[test]
    fn preferences_are_validated() {
        assert_eq!(rec(&[]).validate_preferences(5), Err(CoreError::EmptyPreferences));
        assert_eq!(rec(&["CSE", "CSE"]).validate_preferences(5), Err(CoreError::DuplicatePreference));
        assert_eq!(
            rec(&["A", "B", "C"]).validate_preferences(2),
            Err(CoreError::TooManyPreferences { max: 2, got: 3 })
        );
        assert!(rec(&["A", "B"]).validate_preferences(5).is_ok());
    }

    #[test]
    fn category_frozen_after_verification() {
        let mut r = rec(&["CSE"]).with_status(ApplicationStatus::Submitted);
        r.set_category(Category::Obc).unwrap();
        assert_eq!(r.category(), Category::Obc);
        r.status = ApplicationStatus::Verified;
        assert_eq!(r.set_category(Category::Sc), Err(CoreError::CategoryFrozen));
        assert_eq!(r.category(), Category::Obc);
    }

    #[test]
    fn seat_record_bounds() {
        let mut s = SeatInventoryRecord::new(b("CSE"), 3);
        assert_eq!(s.filled(), 0);
        s.available_seats = 1;
        assert_eq!(s.filled(), 2);
        s.available_seats = 4;
        assert!(s.validate().is_err());
    }

    #[test]
    fn applicant_json_defaults() {
        let r: ApplicantRecord = serde_json::from_str(
            r#"{"student_id":"S9","category":"sc","base_percentage":91.5,
                "branch_preferences":["CSE","ECE"],"status":"verified"}"#,
        )
        .unwrap();
        assert_eq!(r.category(), Category::Sc);
        assert_eq!(r.student_response, StudentResponse::Pending);
        assert!(!r.seat_locked);
        assert!(r.rank.is_none());
    }
}
