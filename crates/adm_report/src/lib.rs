//! adm_report: pure offline report model + renderers (JSON/HTML).
//!
//! Determinism rules:
//! - No I/O here. Callers hand in a cycle snapshot already in memory.
//! - Scores are formatted from integer hundredths, never through floats.
//! - Stable section order: branches (code order, rows by rank), unallotted
//!   (by rank), rounds (by round number).

#![deny(unsafe_code)]

use core::fmt;

use serde::{Deserialize, Serialize};

use adm_core::{ApplicantRecord, ApplicationStatus, BranchCode, MeritScore, Params};
use adm_io::hasher::sha256_canonical;
use adm_io::snapshot::CycleSnapshot;

pub mod render_html;
pub mod render_json;

pub use render_html::render_html;
pub use render_json::render_json;

// ===== Errors =====

#[derive(Debug)]
pub enum ReportError {
    /// Snapshot contradicts itself (e.g. allotment to a branch with no inventory).
    Inconsistent(String),
    Serialize(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Inconsistent(m) => write!(f, "inconsistent snapshot: {m}"),
            ReportError::Serialize(m) => write!(f, "serialize: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Model =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportModel {
    pub admission_year: u16,
    pub summary: Summary,
    pub branches: Vec<BranchSection>,
    pub unallotted: Vec<UnallottedRow>,
    pub rounds: Vec<RoundSummary>,
    pub integrity: Integrity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub applicants: u32,
    pub ranked: u32,
    pub allotted: u32,
    pub locked: u32,
    pub admitted: u32,
    pub seats_total: u32,
    pub seats_available: u32,
    pub last_round: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSection {
    pub branch: String,
    pub total_seats: u32,
    pub available_seats: u32,
    pub filled: u32,
    pub rows: Vec<AllotmentRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllotmentRow {
    pub rank: u32,
    pub student_id: String,
    pub category: String,
    /// "92.50"
    pub merit_score: String,
    pub round: Option<u32>,
    pub response: String,
    pub seat_locked: bool,
    pub status: String,
    pub register_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnallottedRow {
    pub rank: u32,
    pub student_id: String,
    pub preferences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub id: String,
    pub round: u32,
    pub considered: u32,
    pub allocated: u32,
    pub released: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrity {
    pub inventory_sha256: String,
    pub last_round_id: Option<String>,
}

// ===== Builder =====

pub fn build_report(snap: &CycleSnapshot) -> Result<ReportModel, ReportError> {
    let mut ranked: Vec<_> = snap.applicants.iter().filter(|a| a.rank.is_some()).collect();
    ranked.sort_by_key(|a| a.rank);

    let mut branches: Vec<BranchSection> = snap
        .seats
        .iter()
        .map(|s| BranchSection {
            branch: s.branch.to_string(),
            total_seats: s.total_seats,
            available_seats: s.available_seats,
            filled: s.filled(),
            rows: Vec::new(),
        })
        .collect();
    branches.sort_by(|a, b| a.branch.cmp(&b.branch));

    let mut unallotted = Vec::new();
    for a in &ranked {
        let rank = a.rank.unwrap_or_default();
        match &a.allotted_branch {
            Some(code) => {
                let section = find_section(&mut branches, code)?;
                section.rows.push(AllotmentRow {
                    rank,
                    student_id: a.student_id.to_string(),
                    category: a.category().to_string(),
                    merit_score: merit_display(a, &snap.params),
                    round: a.round,
                    response: a.student_response.to_string(),
                    seat_locked: a.seat_locked,
                    status: a.status.to_string(),
                    register_number: a.register_number.clone(),
                });
            }
            None if a.status == ApplicationStatus::MeritGenerated => unallotted.push(UnallottedRow {
                rank,
                student_id: a.student_id.to_string(),
                preferences: a.branch_preferences.iter().map(|b| b.to_string()).collect(),
            }),
            None => {}
        }
    }

    let mut rounds: Vec<RoundSummary> = snap
        .rounds
        .iter()
        .map(|r| RoundSummary {
            id: r.id.clone(),
            round: r.round,
            considered: r.considered,
            allocated: r.allocated,
            released: r.released,
        })
        .collect();
    rounds.sort_by_key(|r| r.round);

    let summary = Summary {
        applicants: snap.applicants.len() as u32,
        ranked: ranked.len() as u32,
        allotted: snap.applicants.iter().filter(|a| a.allotted_branch.is_some()).count() as u32,
        locked: snap.applicants.iter().filter(|a| a.seat_locked).count() as u32,
        admitted: snap.applicants.iter().filter(|a| a.status == ApplicationStatus::Admitted).count() as u32,
        seats_total: snap.seats.iter().map(|s| s.total_seats).sum(),
        seats_available: snap.seats.iter().map(|s| s.available_seats).sum(),
        last_round: snap.last_round(),
    };

    let integrity = Integrity {
        inventory_sha256: sha256_canonical(&snap.seats).map_err(|e| ReportError::Serialize(e.to_string()))?,
        last_round_id: rounds.last().map(|r| r.id.clone()),
    };

    Ok(ReportModel {
        admission_year: snap.admission_year,
        summary,
        branches,
        unallotted,
        rounds,
        integrity,
    })
}

fn merit_display(app: &ApplicantRecord, params: &Params) -> String {
    MeritScore::new(app.base_percentage, params.bonus_for(app.category())).to_string()
}

fn find_section<'a>(branches: &'a mut [BranchSection], code: &BranchCode) -> Result<&'a mut BranchSection, ReportError> {
    branches
        .iter_mut()
        .find(|s| s.branch == code.as_str())
        .ok_or_else(|| ReportError::Inconsistent(format!("allotment to {code} without seat inventory")))
}
