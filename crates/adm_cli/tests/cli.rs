use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const APPS: &str = r#"{"applicants":[
    {"student_id":"R1","category":"general","base_percentage":95.0,"branch_preferences":["CSE","ECE"],"status":"verified"},
    {"student_id":"R2","category":"general","base_percentage":90.0,"branch_preferences":["CSE","ECE"],"status":"verified"},
    {"student_id":"R3","category":"general","base_percentage":85.0,"branch_preferences":["ECE","CSE"],"status":"verified"}
]}"#;
const SEATS: &str = r#"{"seats":[
    {"branch":"CSE","total_seats":1,"available_seats":1},
    {"branch":"ECE","total_seats":1,"available_seats":1}
]}"#;

fn adm() -> Command {
    let mut c = Command::cargo_bin("adm").unwrap();
    c.env_remove("RUST_LOG");
    c
}

fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("applicants.json"), APPS).unwrap();
    fs::write(dir.path().join("seats.json"), SEATS).unwrap();
    fs::write(
        dir.path().join("manifest.json"),
        r#"{"applicants_path":"applicants.json","seats_path":"seats.json"}"#,
    )
    .unwrap();
    let state = dir.path().join("state.json");
    adm()
        .args(["init", "--manifest"])
        .arg(dir.path().join("manifest.json"))
        .arg("--state")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 applicants"));
    (dir, state)
}

fn state_json(p: &Path) -> Value {
    serde_json::from_slice(&fs::read(p).unwrap()).unwrap()
}

#[test]
fn reject_then_second_round() {
    let (_d, state) = fixture();
    adm().args(["merit", "--state"]).arg(&state).assert().success().stdout("merit: ranked 3\n");
    adm()
        .args(["round", "1", "--state"])
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("allocated 2"));
    adm()
        .args(["respond", "--student", "R1", "--response", "REJECTED", "--state"])
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("released CSE"));
    adm().args(["round", "2", "--state"]).arg(&state).assert().success();

    let v = state_json(&state);
    let r3 = v["applicants"].as_array().unwrap().iter().find(|a| a["student_id"] == "R3").unwrap();
    assert_eq!(r3["allotted_branch"], "CSE");
    assert_eq!(v["rounds"].as_array().unwrap().len(), 2);
}

#[test]
fn exit_codes_by_error_family() {
    let (_d, state) = fixture();
    // round 0: validation
    adm().args(["round", "0", "--state"]).arg(&state).assert().code(2);
    adm().args(["merit", "--state"]).arg(&state).assert().success();
    adm().args(["round", "1", "--state"]).arg(&state).assert().success();
    // repeated round number: state
    adm().args(["round", "1", "--state"]).arg(&state).assert().code(3);
    // unknown student: validation
    adm()
        .args(["respond", "--student", "NOBODY", "--response", "ACCEPTED", "--state"])
        .arg(&state)
        .assert()
        .code(2);
    // PENDING is not an answer
    adm()
        .args(["respond", "--student", "R1", "--response", "PENDING", "--state"])
        .arg(&state)
        .assert()
        .code(2);
    // missing state file: io
    adm().args(["merit", "--state", "/nonexistent/adm/state.json"]).assert().code(4);
}

#[test]
fn init_refuses_overwrite_and_urls() {
    let (d, state) = fixture();
    adm()
        .args(["init", "--manifest"])
        .arg(d.path().join("manifest.json"))
        .arg("--state")
        .arg(&state)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--force"));
    adm()
        .args(["init", "--manifest", "https://example.org/m.json", "--state"])
        .arg(&state)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scheme"));
}

#[test]
fn lifecycle_to_admitted() {
    let (_d, state) = fixture();
    adm().args(["merit", "--state"]).arg(&state).assert().success();
    adm().args(["round", "1", "--state"]).arg(&state).assert().success();
    adm()
        .args(["advance", "--student", "R1", "--to", "documents_verified", "--state"])
        .arg(&state)
        .assert()
        .code(3);
    adm()
        .args(["respond", "--student", "R1", "--response", "ACCEPTED", "--state"])
        .arg(&state)
        .assert()
        .success();
    for to in ["documents_verified", "fee_paid", "admitted"] {
        adm().args(["advance", "--student", "R1", "--to", to, "--state"]).arg(&state).assert().success();
    }
    let v = state_json(&state);
    let r1 = v["applicants"].as_array().unwrap().iter().find(|a| a["student_id"] == "R1").unwrap();
    assert_eq!(r1["register_number"], "2026CSE001");
}

#[test]
fn seeded_merit_is_recorded_in_params() {
    let (_d, state) = fixture();
    adm().args(["merit", "--seed", "0x2a", "--state"]).arg(&state).assert().success();
    let v = state_json(&state);
    assert_eq!(v["params"]["tie_seed"], 42);
    assert_eq!(v["params"]["merit_tie_policy"], "random");
}

#[test]
fn report_renders_json_and_html() {
    let (d, state) = fixture();
    adm().args(["merit", "--state"]).arg(&state).assert().success();
    adm().args(["round", "1", "--state"]).arg(&state).assert().success();
    let out = d.path().join("out");
    adm()
        .args(["--quiet", "report", "--render", "json", "html", "--state"])
        .arg(&state)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let report: Value = serde_json::from_slice(&fs::read(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["unallotted"][0]["student_id"], "R3");
    assert_eq!(report["branches"][0]["rows"][0]["student_id"], "R1");
    let html = fs::read_to_string(out.join("report.html")).unwrap();
    assert!(html.contains("<h2>Branch ECE</h2>"));
}
