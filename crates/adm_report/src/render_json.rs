//! render_json.rs
//! Report JSON renderer. Output is canonical JSON (sorted keys, compact, LF)
//! so two renders of the same snapshot are byte-identical.

use adm_io::canonical_json::to_canonical_bytes;

use crate::{ReportError, ReportModel};

pub fn render_json(m: &ReportModel) -> Result<String, ReportError> {
    let bytes = to_canonical_bytes(m).map_err(|e| ReportError::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_report, fixtures};
    use assert_json_diff::assert_json_include;
    use serde_json::{json, Value};

    #[test]
    fn json_carries_sections() {
        let m = build_report(&fixtures::snapshot()).unwrap();
        let v: Value = serde_json::from_str(&render_json(&m).unwrap()).unwrap();
        assert_json_include!(
            actual: v,
            expected: json!({
                "admission_year": 2026,
                "branches": [
                    { "branch": "CSE", "filled": 1, "rows": [{ "student_id": "S1", "seat_locked": true }] },
                    { "branch": "ECE", "filled": 0, "rows": [] }
                ],
                "unallotted": [{ "student_id": "S2", "rank": 2 }]
            })
        );
    }

    #[test]
    fn render_is_stable() {
        let m = build_report(&fixtures::snapshot()).unwrap();
        assert_eq!(render_json(&m).unwrap(), render_json(&m.clone()).unwrap());
    }
}
