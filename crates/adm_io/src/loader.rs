//! crates/adm_io/src/loader.rs
//! Manifest-driven loading of cycle inputs.
//!
//! Documents:
//!   applicants: `{"applicants": [ApplicantRecord, ...]}`
//!   seats:      `{"seats": [SeatInventoryRecord, ...]}`
//!   params:     `Params` object (every field optional)
//!
//! Each input is parsed to a JSON value first so its canonical digest can be
//! checked against the manifest before typed deserialization.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use adm_core::{ApplicantRecord, Params, SeatInventoryRecord};

use crate::hasher::sha256_canonical;
use crate::manifest::{load_manifest, ManifestError};
use crate::validate::validate_cycle;
use crate::IoError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicantsDoc {
    pub applicants: Vec<ApplicantRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatsDoc {
    pub seats: Vec<SeatInventoryRecord>,
}

/// Canonical digests of the inputs as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShas {
    pub applicants: String,
    pub seats: String,
    pub params: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedCycle {
    pub params: Params,
    pub applicants: Vec<ApplicantRecord>,
    pub seats: Vec<SeatInventoryRecord>,
    pub inputs_sha256: InputShas,
}

// ---------- helpers ----------

fn read_value(path: &Path) -> Result<Value, IoError> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: path.display().to_string(),
        msg: e.to_string(),
    })
}

fn from_value<T: DeserializeOwned>(path: &Path, v: Value) -> Result<T, IoError> {
    serde_json::from_value(v).map_err(|e| IoError::Json {
        pointer: path.display().to_string(),
        msg: e.to_string(),
    })
}

fn verify_digest(key: &'static str, expected: Option<&String>, actual: &str) -> Result<(), IoError> {
    match expected {
        Some(want) if want != actual => Err(ManifestError::DigestMismatch(key, format!("expected {want}, got {actual}")).into()),
        _ => Ok(()),
    }
}

// ---------- full cycle ----------

pub fn load_cycle_from_manifest(manifest_path: &Path) -> Result<LoadedCycle, IoError> {
    let rm = load_manifest(manifest_path)?;

    let apps_v = read_value(&rm.applicants_path)?;
    let seats_v = read_value(&rm.seats_path)?;
    let params_v = rm.params_path.as_deref().map(read_value).transpose()?;

    let shas = InputShas {
        applicants: sha256_canonical(&apps_v)?,
        seats: sha256_canonical(&seats_v)?,
        params: params_v.as_ref().map(sha256_canonical).transpose()?,
    };
    verify_digest("applicants_path", rm.digests.applicants_path.as_ref(), &shas.applicants)?;
    verify_digest("seats_path", rm.digests.seats_path.as_ref(), &shas.seats)?;
    if let Some(actual) = &shas.params {
        verify_digest("params_path", rm.digests.params_path.as_ref(), actual)?;
    }

    let applicants = from_value::<ApplicantsDoc>(&rm.applicants_path, apps_v)?.applicants;
    let seats = from_value::<SeatsDoc>(&rm.seats_path, seats_v)?.seats;
    let params = match (params_v, &rm.params_path) {
        (Some(v), Some(p)) => from_value::<Params>(p, v)?,
        _ => Params::default(),
    };

    validate_cycle(&params, &applicants, &seats)?;

    Ok(LoadedCycle { params, applicants, seats, inputs_sha256: shas })
}
