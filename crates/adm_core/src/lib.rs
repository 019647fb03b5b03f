//! adm_core: Core types, domains, and the seeded tie RNG for the admission engine.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! workspace (`adm_algo`, `adm_io`, `adm_pipeline`, `adm_report`, `adm_cli`).
//!
//! - Registry tokens: `StudentId`, `BranchCode`
//! - Integer-first scores: `Percentage`, `MeritScore` (hundredths)
//! - Records: `ApplicantRecord`, `SeatInventoryRecord`, `RoundRecord`
//! - Lifecycle: `ApplicationStatus` transition table, `StudentResponse`
//! - Config domain: `Params` (+ `validate_domains`)
//! - Seedable RNG (ChaCha20) for merit lottery ties only

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    use crate::status::ApplicationStatus;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        DomainOutOfRange(&'static str),
        EmptyPreferences,
        TooManyPreferences { max: usize, got: usize },
        DuplicatePreference,
        IllegalTransition {
            from: ApplicationStatus,
            to: ApplicationStatus,
        },
        CategoryFrozen,
        UnknownToken(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::EmptyPreferences => write!(f, "branch preferences must not be empty"),
                CoreError::TooManyPreferences { max, got } => {
                    write!(f, "too many branch preferences: {got} (max {max})")
                }
                CoreError::DuplicatePreference => write!(f, "duplicate branch in preferences"),
                CoreError::IllegalTransition { from, to } => {
                    write!(f, "illegal status transition: {from} -> {to}")
                }
                CoreError::CategoryFrozen => {
                    write!(f, "category is immutable once verification completes")
                }
                CoreError::UnknownToken(k) => write!(f, "unknown {k} token"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod audit;
pub mod entities;
pub mod ids;
pub mod percent;
pub mod rng;
pub mod status;
pub mod variables;

pub use errors::CoreError;
pub use entities::{ApplicantRecord, Category, SeatInventoryRecord};
pub use ids::{BranchCode, StudentId};
pub use percent::{MeritScore, Percentage};
pub use status::{ApplicationStatus, StudentResponse};
pub use variables::Params;
