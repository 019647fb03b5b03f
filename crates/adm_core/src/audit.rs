//! Round audit records appended after each completed allocation round.

use serde::{Deserialize, Serialize};

use crate::ids::{BranchCode, StudentId};

/// One assignment made during a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allotment {
    pub student_id: StudentId,
    pub rank: u32,
    pub branch: BranchCode,
    /// Index into the applicant's preference list (0 = first choice).
    pub preference_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacated: Option<BranchCode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// "RND:<round>-<16 hex>"
    pub id: String,
    pub round: u32,
    pub considered: u32,
    pub allocated: u32,
    pub released: u32,
    pub inventory_before_sha256: String,
    pub inventory_after_sha256: String,
    pub allotments: Vec<Allotment>,
}
