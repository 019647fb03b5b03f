// crates/adm_cli/src/args.rs
//
// CLI argument surface: one subcommand per cycle operation, all working on a
// single snapshot file (`--state`).
//
// - No networked paths (reject any scheme:// like http/https/file)
// - Seed override accepts u64 decimal or 0x-hex up to 16 nybbles
// - Student ids, responses and statuses are parsed here so bad tokens fail
//   before any state is read

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use adm_core::{ApplicationStatus, StudentId, StudentResponse};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "adm",
    disable_help_subcommand = true,
    about = "Offline, deterministic admission seat allocation"
)]
pub struct Args {
    /// Log warnings and errors only (RUST_LOG still wins when set).
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Load applicants + seats (+ params) from a manifest and write a fresh state file.
    Init {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        state: PathBuf,
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },
    /// Rank verified applicants.
    Merit {
        #[arg(long)]
        state: PathBuf,
        /// Seed the merit lottery (switches tie policy to `random`).
        #[arg(long, value_parser = parse_seed)]
        seed: Option<u64>,
    },
    /// Run allocation round N (1 = initial, 2+ = reallocation).
    Round {
        round: u32,
        #[arg(long)]
        state: PathBuf,
    },
    /// Record a student's answer to their current offer.
    Respond {
        #[arg(long)]
        state: PathBuf,
        #[arg(long, value_parser = parse_student)]
        student: StudentId,
        /// ACCEPTED | REJECTED | UPGRADE_REQUESTED
        #[arg(long, value_parser = parse_response)]
        response: StudentResponse,
    },
    /// Move an applicant along the administrative lifecycle.
    Advance {
        #[arg(long)]
        state: PathBuf,
        #[arg(long, value_parser = parse_student)]
        student: StudentId,
        #[arg(long, value_parser = parse_status)]
        to: ApplicationStatus,
    },
    /// Render the allotment report into DIR.
    Report {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_parser = ["json", "html"], num_args = 1..=2, required = true)]
        render: Vec<String>,
    },
}

impl Command {
    fn paths(&self) -> Vec<&Path> {
        match self {
            Command::Init { manifest, state, .. } => vec![manifest, state],
            Command::Merit { state, .. }
            | Command::Round { state, .. }
            | Command::Respond { state, .. }
            | Command::Advance { state, .. } => vec![state],
            Command::Report { state, out, .. } => vec![state, out],
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

fn parse_student(s: &str) -> Result<StudentId, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_response(s: &str) -> Result<StudentResponse, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_status(s: &str) -> Result<ApplicationStatus, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    adm_io::looks_like_url_strict(&lower) || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    for p in args.command.paths() {
        ensure_local_path(p)?;
    }
    if let Command::Init { manifest, .. } = &args.command {
        if !manifest.is_file() {
            return Err(CliError::NotFound(format!("--manifest {}", manifest.display())));
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xff").unwrap(), 255);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0x11111111111111111").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn schemes_are_rejected() {
        assert!(ensure_local_path(Path::new("https://x/state.json")).is_err());
        assert!(ensure_local_path(Path::new("file:state.json")).is_err());
        assert!(ensure_local_path(Path::new("state.json")).is_ok());
    }

    #[test]
    fn subcommands_parse() {
        let a = Args::try_parse_from([
            "adm", "respond", "--state", "s.json", "--student", "S1", "--response", "upgrade_requested", "--quiet",
        ])
        .unwrap();
        assert!(a.quiet);
        assert!(matches!(a.command, Command::Respond { response: StudentResponse::UpgradeRequested, .. }));

        let a = Args::try_parse_from(["adm", "round", "2", "--state", "s.json"]).unwrap();
        assert!(matches!(a.command, Command::Round { round: 2, .. }));

        assert!(Args::try_parse_from(["adm", "advance", "--state", "s", "--student", "S1", "--to", "bogus"]).is_err());
        assert!(Args::try_parse_from(["adm", "report", "--state", "s", "--out", "d", "--render", "pdf"]).is_err());
    }
}
