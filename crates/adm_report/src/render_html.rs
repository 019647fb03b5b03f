//! render_html.rs
//! Deterministic, offline HTML renderer. Single document, inline CSS,
//! no scripts or external assets. Every content field is escaped.

use std::fmt::Write as _;

use crate::{BranchSection, ReportModel};

// ------------------------- formatting helpers -------------------------

/// Escape text for HTML (minimal, deterministic).
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn opt(s: Option<&str>) -> String {
    s.map(esc).unwrap_or_else(|| "&ndash;".to_string())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

// ------------------------- HTML builder -------------------------

struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    fn new() -> Self {
        Self { buf: String::with_capacity(16 * 1024) }
    }

    fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n",
            esc(title),
            CSS
        );
    }

    fn h1(&mut self, s: &str) {
        let _ = writeln!(self.buf, "<h1>{}</h1>", esc(s));
    }

    fn h2(&mut self, s: &str) {
        let _ = writeln!(self.buf, "<h2>{}</h2>", esc(s));
    }

    fn dl(&mut self, rows: &[(&str, String)]) {
        self.buf.push_str("<dl>\n");
        for (k, v) in rows {
            let _ = writeln!(self.buf, "<dt>{}</dt><dd>{}</dd>", esc(k), esc(v));
        }
        self.buf.push_str("</dl>\n");
    }

    /// Cells are expected pre-escaped.
    fn table(&mut self, head: &[&str], rows: &[Vec<String>]) {
        self.buf.push_str("<table>\n<thead><tr>");
        for h in head {
            let _ = write!(self.buf, "<th>{}</th>", esc(h));
        }
        self.buf.push_str("</tr></thead>\n<tbody>\n");
        for r in rows {
            self.buf.push_str("<tr>");
            for c in r {
                let _ = write!(self.buf, "<td>{c}</td>");
            }
            self.buf.push_str("</tr>\n");
        }
        self.buf.push_str("</tbody>\n</table>\n");
    }

    fn p(&mut self, s: &str) {
        let _ = writeln!(self.buf, "<p>{}</p>", esc(s));
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</body>\n</html>\n");
        self.buf
    }
}

const CSS: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#111}\
table{border-collapse:collapse;margin:.5rem 0 1.5rem}\
th,td{border:1px solid #ccc;padding:.25rem .6rem;text-align:left}\
th{background:#f3f3f3}\
dl{display:grid;grid-template-columns:max-content auto;gap:.2rem 1rem}\
dt{font-weight:600}";

// ------------------------- sections -------------------------

pub fn render_html(m: &ReportModel) -> String {
    let mut h = HtmlBuilder::new();
    let title = format!("Seat Allotment Report {}", m.admission_year);
    h.start(&title);
    h.h1(&title);

    h.h2("Summary");
    let s = &m.summary;
    h.dl(&[
        ("Applicants", s.applicants.to_string()),
        ("Ranked", s.ranked.to_string()),
        ("Allotted", s.allotted.to_string()),
        ("Seats locked", s.locked.to_string()),
        ("Admitted", s.admitted.to_string()),
        ("Seats total", s.seats_total.to_string()),
        ("Seats available", s.seats_available.to_string()),
        ("Rounds completed", s.last_round.to_string()),
    ]);

    for b in &m.branches {
        branch_section(&mut h, b);
    }

    h.h2("Unallotted");
    if m.unallotted.is_empty() {
        h.p("None.");
    } else {
        let rows: Vec<Vec<String>> = m
            .unallotted
            .iter()
            .map(|u| vec![u.rank.to_string(), esc(&u.student_id), esc(&u.preferences.join(", "))])
            .collect();
        h.table(&["Rank", "Student", "Preferences"], &rows);
    }

    h.h2("Rounds");
    if m.rounds.is_empty() {
        h.p("No allocation round has run.");
    } else {
        let rows: Vec<Vec<String>> = m
            .rounds
            .iter()
            .map(|r| {
                vec![
                    r.round.to_string(),
                    esc(&r.id),
                    r.considered.to_string(),
                    r.allocated.to_string(),
                    r.released.to_string(),
                ]
            })
            .collect();
        h.table(&["Round", "Record", "Considered", "Allocated", "Released"], &rows);
    }

    h.h2("Integrity");
    h.dl(&[
        ("Inventory SHA-256", m.integrity.inventory_sha256.clone()),
        ("Last round", m.integrity.last_round_id.clone().unwrap_or_else(|| "none".into())),
    ]);

    h.finish()
}

fn branch_section(h: &mut HtmlBuilder, b: &BranchSection) {
    h.h2(&format!("Branch {}", b.branch));
    h.p(&format!("{} of {} seats filled, {} available", b.filled, b.total_seats, b.available_seats));
    if b.rows.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = b
        .rows
        .iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                esc(&r.student_id),
                esc(&r.category),
                esc(&r.merit_score),
                r.round.map(|n| n.to_string()).unwrap_or_default(),
                esc(&r.response),
                yes_no(r.seat_locked).to_string(),
                esc(&r.status),
                opt(r.register_number.as_deref()),
            ]
        })
        .collect();
    h.table(
        &["Rank", "Student", "Category", "Merit", "Round", "Response", "Locked", "Status", "Register no."],
        &rows,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_report, fixtures};

    #[test]
    fn escapes_and_is_asset_free() {
        assert_eq!(esc("<a href='x'>&</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;");
        let html = render_html(&build_report(&fixtures::snapshot()).unwrap());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<h2>Branch CSE</h2>"));
        assert!(html.contains("<td>95.00</td>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("http"));
    }
}
