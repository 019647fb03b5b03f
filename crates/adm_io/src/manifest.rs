// crates/adm_io/src/manifest.rs
//
// Manifest describing where the cycle inputs live.
// • Inputs are paths only: applicants, seats, and optionally params.
// • Offline-only: reject any path with a scheme ("://", "http:", "https:").
// • Relative paths resolve against the manifest's directory.
// • Digests (if provided) must be 64-lower-hex and only for present inputs;
//   they are checked over canonical JSON bytes by the loader.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hasher::is_lower_hex_64;
use crate::looks_like_url_strict;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Optional user-provided identifier; not used in any artifact.
    #[serde(default)]
    pub id: Option<String>,

    pub applicants_path: String,
    pub seats_path: String,
    /// Absent → `Params::default()`.
    #[serde(default)]
    pub params_path: Option<String>,

    #[serde(default)]
    pub inputs_sha256: Option<InputDigests>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDigests {
    #[serde(default)]
    pub applicants_path: Option<String>,
    #[serde(default)]
    pub seats_path: Option<String>,
    #[serde(default)]
    pub params_path: Option<String>,
}

/// Paths resolved against the manifest's directory.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub applicants_path: PathBuf,
    pub seats_path: PathBuf,
    pub params_path: Option<PathBuf>,
    pub digests: InputDigests,
}

#[derive(Debug)]
pub enum ManifestError {
    Empty(&'static str),
    UrlPath(&'static str, String),
    Io(&'static str, String),
    NotAFile(&'static str, String),
    DigestShape(&'static str, String),
    DigestMismatch(&'static str, String),
    DigestForMissing(&'static str),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ManifestError::*;
        match self {
            Empty(k) => write!(f, "field must not be empty: {k}"),
            UrlPath(k, v) => write!(f, "path must be offline (no scheme) for {k}: {v}"),
            Io(k, v) => write!(f, "cannot access {k}: {v}"),
            NotAFile(k, v) => write!(f, "path is not a file for {k}: {v}"),
            DigestShape(k, v) => write!(f, "invalid sha256 format for {k}: {v}"),
            DigestMismatch(k, v) => write!(f, "sha256 mismatch for {k}: {v}"),
            DigestForMissing(k) => write!(f, "digest supplied for missing input: {k}"),
        }
    }
}

impl std::error::Error for ManifestError {}

// ---------- helpers ----------

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn check_path(key: &'static str, s: &str) -> Result<(), ManifestError> {
    if s.trim().is_empty() {
        return Err(ManifestError::Empty(key));
    }
    if looks_like_url_strict(s) {
        return Err(ManifestError::UrlPath(key, s.to_string()));
    }
    Ok(())
}

fn check_digest(key: &'static str, d: &Option<String>) -> Result<(), ManifestError> {
    match d {
        Some(h) if !is_lower_hex_64(h) => Err(ManifestError::DigestShape(key, h.clone())),
        _ => Ok(()),
    }
}

fn ensure_file(key: &'static str, p: &Path) -> Result<(), ManifestError> {
    let md = fs::metadata(p).map_err(|e| ManifestError::Io(key, format!("{}: {e}", p.display())))?;
    if !md.is_file() {
        return Err(ManifestError::NotAFile(key, p.display().to_string()));
    }
    Ok(())
}

// ---------- validation & resolution ----------

/// Shape and offline checks. No I/O.
pub fn validate_manifest(man: &Manifest) -> Result<(), ManifestError> {
    check_path("applicants_path", &man.applicants_path)?;
    check_path("seats_path", &man.seats_path)?;
    if let Some(p) = &man.params_path {
        check_path("params_path", p)?;
    }
    if let Some(d) = &man.inputs_sha256 {
        check_digest("applicants_path", &d.applicants_path)?;
        check_digest("seats_path", &d.seats_path)?;
        check_digest("params_path", &d.params_path)?;
        if d.params_path.is_some() && man.params_path.is_none() {
            return Err(ManifestError::DigestForMissing("params_path"));
        }
    }
    Ok(())
}

/// Resolve every path against `base` and check each one is an existing file.
pub fn resolve_paths(base: &Path, man: &Manifest) -> Result<ResolvedManifest, ManifestError> {
    validate_manifest(man)?;
    let applicants_path = join_under(base, &man.applicants_path);
    let seats_path = join_under(base, &man.seats_path);
    let params_path = man.params_path.as_deref().map(|p| join_under(base, p));

    ensure_file("applicants_path", &applicants_path)?;
    ensure_file("seats_path", &seats_path)?;
    if let Some(p) = &params_path {
        ensure_file("params_path", p)?;
    }

    Ok(ResolvedManifest {
        applicants_path,
        seats_path,
        params_path,
        digests: man.inputs_sha256.clone().unwrap_or_default(),
    })
}

/// Parse and resolve a manifest file; relative paths are taken from its directory.
pub fn load_manifest(path: &Path) -> Result<ResolvedManifest, crate::IoError> {
    let text = fs::read_to_string(path).map_err(|e| crate::IoError::Path(format!("{}: {e}", path.display())))?;
    let man: Manifest = serde_json::from_str(&text).map_err(|e| crate::IoError::Json {
        pointer: path.display().to_string(),
        msg: e.to_string(),
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(resolve_paths(base, &man)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn man(a: &str, s: &str) -> Manifest {
        Manifest {
            id: None,
            applicants_path: a.into(),
            seats_path: s.into(),
            params_path: None,
            inputs_sha256: None,
        }
    }

    #[test]
    fn urls_are_rejected() {
        let m = man("https://example.org/a.json", "seats.json");
        assert!(matches!(validate_manifest(&m), Err(ManifestError::UrlPath("applicants_path", _))));
        let m = man("a.json", "file:///seats.json");
        assert!(matches!(validate_manifest(&m), Err(ManifestError::UrlPath("seats_path", _))));
    }

    #[test]
    fn digest_shape_and_presence() {
        let mut m = man("a.json", "s.json");
        m.inputs_sha256 = Some(InputDigests { seats_path: Some("XYZ".into()), ..Default::default() });
        assert!(matches!(validate_manifest(&m), Err(ManifestError::DigestShape("seats_path", _))));
        m.inputs_sha256 = Some(InputDigests { params_path: Some("a".repeat(64)), ..Default::default() });
        assert!(matches!(validate_manifest(&m), Err(ManifestError::DigestForMissing("params_path"))));
    }

    #[test]
    fn resolves_relative_to_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("s.json"), "{}").unwrap();
        let mp = dir.path().join("manifest.json");
        fs::write(&mp, r#"{"applicants_path":"a.json","seats_path":"s.json"}"#).unwrap();
        let r = load_manifest(&mp).unwrap();
        assert_eq!(r.applicants_path, dir.path().join("a.json"));
        assert!(r.params_path.is_none());
    }

    #[test]
    fn missing_input_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_paths(dir.path(), &man("nope.json", "s.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Io("applicants_path", _)));
    }

    #[test]
    fn unknown_manifest_fields_are_rejected() {
        let res: Result<Manifest, _> =
            serde_json::from_str(r#"{"applicants_path":"a","seats_path":"s","extra":1}"#);
        assert!(res.is_err());
    }
}
