//! Application lifecycle and student response as explicit enums.
//!
//! `ApplicationStatus` is the authoritative gate for which stage may act on a
//! record. Every status change goes through [`transition`], which consults a
//! fixed table; nothing else may assign a status.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    CorrectionRequested,
    Verified,
    MeritGenerated,
    SeatAllotted,
    DocumentsVerified,
    FeePaid,
    Admitted,
    Rejected,
}

use ApplicationStatus::*;

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 10] = [
        Draft,
        Submitted,
        CorrectionRequested,
        Verified,
        MeritGenerated,
        SeatAllotted,
        DocumentsVerified,
        FeePaid,
        Admitted,
        Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Draft => "draft",
            Submitted => "submitted",
            CorrectionRequested => "correction_requested",
            Verified => "verified",
            MeritGenerated => "merit_generated",
            SeatAllotted => "seat_allotted",
            DocumentsVerified => "documents_verified",
            FeePaid => "fee_paid",
            Admitted => "admitted",
            Rejected => "rejected",
        }
    }

    /// Outgoing edges of the lifecycle table.
    pub fn allowed_next(self) -> &'static [ApplicationStatus] {
        match self {
            Draft => &[Submitted],
            Submitted => &[Verified, CorrectionRequested, Rejected],
            CorrectionRequested => &[Submitted, Rejected],
            Verified => &[MeritGenerated, Rejected],
            MeritGenerated => &[SeatAllotted],
            // Back-edge: a rejected or upgrade-requested offer re-enters the pool.
            SeatAllotted => &[MeritGenerated, DocumentsVerified],
            DocumentsVerified => &[FeePaid],
            FeePaid => &[Admitted],
            Admitted | Rejected => &[],
        }
    }

    #[inline]
    pub fn can_transition(self, to: ApplicationStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// True once verification has completed (category is frozen from here on).
    pub fn is_past_verification(self) -> bool {
        !matches!(self, Draft | Submitted | CorrectionRequested)
    }
}

/// Validate a single lifecycle step and return the new status.
pub fn transition(from: ApplicationStatus, to: ApplicationStatus) -> Result<ApplicationStatus, CoreError> {
    if from.can_transition(to) {
        Ok(to)
    } else {
        Err(CoreError::IllegalTransition { from, to })
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = CoreError;
    /// Accepts `merit_generated` and `merit-generated`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        ApplicationStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == norm)
            .ok_or(CoreError::UnknownToken("status"))
    }
}

/// A student's answer to the current offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentResponse {
    #[default]
    Pending,
    Accepted,
    Rejected,
    UpgradeRequested,
}

impl StudentResponse {
    pub fn as_str(self) -> &'static str {
        match self {
            StudentResponse::Pending => "PENDING",
            StudentResponse::Accepted => "ACCEPTED",
            StudentResponse::Rejected => "REJECTED",
            StudentResponse::UpgradeRequested => "UPGRADE_REQUESTED",
        }
    }
}

impl fmt::Display for StudentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentResponse {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING" => Ok(StudentResponse::Pending),
            "ACCEPTED" | "ACCEPT" => Ok(StudentResponse::Accepted),
            "REJECTED" | "REJECT" => Ok(StudentResponse::Rejected),
            "UPGRADE_REQUESTED" | "UPGRADE" => Ok(StudentResponse::UpgradeRequested),
            _ => Err(CoreError::UnknownToken("response")),
        }
    }
}
