// crates/adm_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure allocation algorithms. No I/O, no logging, no store access: callers
//! hand in records and a ledger and get decisions back.

// ----------------------------- Merit ranking -----------------------------------------

pub mod merit;
pub use merit::{merit_score, rank_applicants, MeritError, RankedEntry};

// ----------------------------- Seat inventory ----------------------------------------

pub mod ledger;
pub use ledger::{LedgerError, SeatLedger};

// ----------------------------- Preference scan ---------------------------------------

pub mod scan;
pub use scan::{apply_offer, first_fit, is_eligible, scan_window, Offer, RoundKind, ScanWindow};

// ----------------------------- Student response --------------------------------------

pub mod respond;
pub use respond::{apply_response, ResponseEffect, ResponseError};
