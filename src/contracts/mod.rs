//! Contract verifier: architectural rules checked against the merged
//! baseline, gating CI on blocking findings.

pub mod checks;

use std::fmt::{self, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::graph::{load_json, MergedGraph};
use crate::ports::filesystem::FileSystem;

/// Sections a baseline must contain before any check runs.
pub const REQUIRED_SECTIONS: &[&str] = &["controllers", "dtos", "components", "hooks"];

/// Findings printed per check before eliding the rest.
const SHOWN_FINDINGS: usize = 10;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "--------------------------------------------------";

/// Whether a finding blocks verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocking.
    Fail,
    /// Reported, not blocking.
    Warn,
}

/// One rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    /// Check number, 1 to 5.
    pub check: u8,
    /// Blocking or not.
    pub severity: Severity,
    /// Offending controller, DTO, endpoint or component.
    pub item: String,
    /// What is wrong.
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.severity {
            Severity::Fail => '\u{2717}',
            Severity::Warn => '\u{26a0}',
        };
        write!(f, "  {icon} {}: {}", self.item, self.detail)
    }
}

/// Result of running one check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Check number.
    pub number: u8,
    /// Section header.
    pub title: &'static str,
    /// Name used on the PASS/FAIL line.
    pub label: &'static str,
    /// Findings in detection order.
    pub findings: Vec<Finding>,
    /// Extra lines printed before the status.
    pub notes: Vec<String>,
    /// The check had nothing to compare and printed notes only.
    pub informational: bool,
}

impl CheckOutcome {
    /// Creates an outcome with no notes.
    #[must_use]
    pub fn new(number: u8, title: &'static str, label: &'static str, findings: Vec<Finding>) -> Self {
        Self { number, title, label, findings, notes: Vec::new(), informational: false }
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

/// Outcome of the whole battery.
#[derive(Debug, Clone)]
pub struct Verification {
    /// One outcome per check, in check order.
    pub checks: Vec<CheckOutcome>,
}

impl Verification {
    /// Number of FAIL findings.
    #[must_use]
    pub fn blocking(&self) -> usize {
        self.checks.iter().map(|c| c.count(Severity::Fail)).sum()
    }

    /// Number of WARN findings.
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.checks.iter().map(|c| c.count(Severity::Warn)).sum()
    }

    /// `true` when nothing blocks.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.blocking() == 0
    }

    /// Renders per-check results followed by the summary.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{RULE}\nKOINON RMS CONTRACT VERIFICATION\n{RULE}");

        for check in &self.checks {
            let _ = writeln!(out, "\nCheck {}: {}\n{THIN_RULE}", check.number, check.title);
            for note in &check.notes {
                let _ = writeln!(out, "  {note}");
            }
            if check.informational {
                continue;
            }
            if check.findings.is_empty() {
                let _ = writeln!(out, "  \u{2713} {}: PASS", check.label);
                continue;
            }
            let status = if check.count(Severity::Fail) > 0 { "FAIL" } else { "WARN" };
            let _ = writeln!(
                out,
                "  \u{2717} {}: {status} ({} violations)",
                check.label,
                check.findings.len()
            );
            for finding in check.findings.iter().take(SHOWN_FINDINGS) {
                let _ = writeln!(out, "    {finding}");
            }
            if check.findings.len() > SHOWN_FINDINGS {
                let _ = writeln!(out, "    ... and {} more", check.findings.len() - SHOWN_FINDINGS);
            }
        }

        let _ = writeln!(out, "\n{RULE}\nSUMMARY\n{RULE}");
        let (blocking, warnings) = (self.blocking(), self.warnings());
        if blocking > 0 {
            let _ = writeln!(out, "\n\u{2717} VERIFICATION FAILED\n  Blocking violations: {blocking}");
        } else {
            let _ = writeln!(out, "\n\u{2713} VERIFICATION PASSED");
        }
        if warnings > 0 {
            let _ = writeln!(out, "  Warnings: {warnings}");
        }
        out
    }
}

/// Loads a baseline and checks that every required section is present.
///
/// # Errors
///
/// [`GraphError::MissingInput`] if the file does not exist,
/// [`GraphError::MalformedInput`] if it is not JSON, lacks a required
/// section, or does not fit the graph schema.
pub fn load_baseline(fs: &dyn FileSystem, path: &Path) -> Result<MergedGraph> {
    let raw: Value = load_json(fs, path)?;
    let Some(object) = raw.as_object() else {
        return Err(GraphError::malformed(path, "graph is not a JSON object"));
    };
    if let Some(section) = REQUIRED_SECTIONS.iter().find(|s| !object.contains_key(**s)) {
        return Err(GraphError::malformed(path, format!("Graph missing required section: {section}")));
    }
    serde_json::from_value(raw).map_err(|e| GraphError::malformed(path, e))
}

/// Runs all five checks in order.
#[must_use]
pub fn verify(graph: &MergedGraph) -> Verification {
    Verification {
        checks: vec![
            checks::response_envelopes(graph),
            checks::integer_ids(graph),
            checks::idkey_routes(graph),
            checks::hook_wrapping(graph),
            checks::type_alignment(graph),
        ],
    }
}
