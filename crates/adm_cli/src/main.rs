// crates/adm_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup and one handler per
// subcommand. Every mutating subcommand reads the state file, drives the
// engine, and writes the state back, including after a failed round
// (assignments made before the failure are already committed).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const STATE: i32 = 3;
    pub const IO: i32 = 4;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use adm_core::variables::MeritTiePolicy;
use adm_core::Params;
use adm_io::canonical_json::write_atomic;
use adm_io::loader::load_cycle_from_manifest;
use adm_io::snapshot::{read_snapshot, write_snapshot, CycleSnapshot};
use adm_io::IoError;
use adm_pipeline::{AdmissionEngine, MemoryStore, PipelineError, StoreError};
use adm_report::{build_report, render_html, render_json, ReportError};

use args::{parse_and_validate, Args, Command};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad input: arguments, documents, manifest, digests, unknown student
    Validation(String),
    /// Operation not allowed in the current cycle state
    State(String),
    /// Filesystem or store backend
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::State(m) => write!(f, "state: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("adm: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("adm: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` under `--quiet`. Logs go to stderr.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::State(_) => STATE,
        MainError::Io(_) => IO,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(m) => MainError::Io(m),
        other => MainError::Validation(other.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Validation(m) => MainError::Validation(m),
        PipelineError::State(m) => MainError::State(m),
        PipelineError::CycleBusy => MainError::State("cycle busy".into()),
        PipelineError::Store(StoreError::NotFound(id)) => MainError::Validation(format!("unknown student {id}")),
        PipelineError::Store(s) => MainError::Io(s.to_string()),
        PipelineError::Audit(m) => MainError::Io(m),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    match e {
        ReportError::Inconsistent(m) => MainError::Validation(m),
        ReportError::Serialize(m) => MainError::Io(m),
    }
}

fn run(args: &Args) -> Result<(), MainError> {
    match &args.command {
        Command::Init { manifest, state, force } => init(manifest, state, *force),
        Command::Merit { state, seed } => {
            let seed = *seed;
            with_engine(
                state,
                |p| {
                    if let Some(s) = seed {
                        p.tie_seed = Some(s);
                        p.merit_tie_policy = MeritTiePolicy::Random;
                    }
                },
                |e| {
                    let out = e.generate_merit()?;
                    if out.is_noop() {
                        println!("merit: no verified applicants");
                    } else {
                        println!("merit: ranked {}", out.ranked_count);
                    }
                    Ok(())
                },
            )
        }
        Command::Round { round, state } => with_engine(state, |_| {}, |e| {
            let out = e.run_round(*round)?;
            println!(
                "round {}: allocated {}, considered {}, released {}, unallotted {} ({})",
                out.round,
                out.allocated_count,
                out.considered_count,
                out.released_count,
                out.unallotted.len(),
                out.record_id
            );
            Ok(())
        }),
        Command::Respond { state, student, response } => with_engine(state, |_| {}, |e| {
            let out = e.respond(student, *response)?;
            match &out.released_branch {
                Some(b) => println!("respond: {student} {response}, released {b}"),
                None => println!("respond: {student} {response}"),
            }
            Ok(())
        }),
        Command::Advance { state, student, to } => with_engine(state, |_| {}, |e| {
            let status = e.transition(student, *to)?;
            println!("advance: {student} -> {status}");
            Ok(())
        }),
        Command::Report { state, out, render } => report(state, out, render),
    }
}

fn init(manifest: &Path, state: &Path, force: bool) -> Result<(), MainError> {
    if state.exists() && !force {
        return Err(MainError::State(format!(
            "{} already exists (use --force to overwrite)",
            state.display()
        )));
    }
    let loaded = load_cycle_from_manifest(manifest).map_err(map_io_err)?;
    let snap = CycleSnapshot::from(loaded);
    write_snapshot(state, &snap).map_err(map_io_err)?;
    info!(
        state = %state.display(),
        applicants = snap.applicants.len(),
        branches = snap.seats.len(),
        "cycle initialized"
    );
    println!("init: {} applicants, {} branches", snap.applicants.len(), snap.seats.len());
    Ok(())
}

/// Load state, let `tweak` adjust params, run `op`, persist what the engine holds.
fn with_engine<T, F>(state: &Path, tweak: T, op: F) -> Result<(), MainError>
where
    T: FnOnce(&mut Params),
    F: FnOnce(&AdmissionEngine<MemoryStore>) -> Result<(), PipelineError>,
{
    let CycleSnapshot { mut params, applicants, seats, rounds, .. } = read_snapshot(state).map_err(map_io_err)?;
    tweak(&mut params);
    let store = MemoryStore::new(applicants, seats).map_err(|e| map_pipeline_err(e.into()))?;
    let engine = AdmissionEngine::with_rounds(params.clone(), store, rounds).map_err(map_pipeline_err)?;

    let result = op(&engine);

    let (store, rounds) = engine.into_parts();
    let (applicants, seats) = store.into_parts();
    let mut next = CycleSnapshot::new(params, applicants, seats);
    next.rounds = rounds;
    let written = write_snapshot(state, &next);

    match (result, written) {
        (Ok(()), written) => written.map_err(map_io_err),
        (Err(e), Ok(())) => {
            warn!(state = %state.display(), error = %e, "operation failed; committed state persisted");
            Err(map_pipeline_err(e))
        }
        (Err(e), Err(w)) => {
            error!(state = %state.display(), error = %w, "state could not be persisted");
            Err(map_pipeline_err(e))
        }
    }
}

fn report(state: &Path, out_dir: &Path, render: &[String]) -> Result<(), MainError> {
    let snap = read_snapshot(state).map_err(map_io_err)?;
    let model = build_report(&snap).map_err(map_report_err)?;
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    for fmt in render {
        let (name, body) = match fmt.as_str() {
            "json" => ("report.json", render_json(&model).map_err(map_report_err)?),
            "html" => ("report.html", render_html(&model)),
            other => return Err(MainError::Validation(format!("unknown renderer: {other}"))),
        };
        let path = out_dir.join(name);
        write_atomic(&path, body.as_bytes()).map_err(|e| MainError::Io(format!("write {name}: {e}")))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}
