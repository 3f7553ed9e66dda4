//! Parsing of OpenSees output artifacts back into typed results.
//!
//! The generated script dumps three whitespace-delimited files into the
//! working directory: `node_displacements.out`, `node_reactions.out` and
//! `element_forces.out`. Each line starts with the node/element id followed
//! by the numeric payload. Blank lines are tolerated; anything else
//! malformed is a reported error, never silently dropped.

use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::error::EngineError;
use crate::results::{FrameForces, FrameResult, NodalDisplacement, NodalReaction};

const DISPLACEMENTS_FILE: &str = "node_displacements.out";
const REACTIONS_FILE: &str = "node_reactions.out";
const ELEMENT_FORCES_FILE: &str = "element_forces.out";

/// Marker the script prints when the static analysis converged
const SUCCESS_MARKER: &str = "ANALYSIS COMPLETE";

/// Reads solver output artifacts from a working directory.
pub struct ResultsParser {
    work_dir: PathBuf,
}

impl ResultsParser {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Whether the captured stdout carries the convergence marker
    pub fn check_analysis_success(&self, stdout: &str) -> bool {
        stdout.contains(SUCCESS_MARKER)
    }

    /// Extract a short diagnostic from solver output for failed runs.
    ///
    /// OpenSees reports problems on stdout as lines starting with
    /// "WARNING" or containing "error"; the first few of those make a far
    /// better message than the full transcript.
    pub fn extract_diagnostics(&self, stdout: &str, stderr: &str) -> String {
        let Ok(pattern) = Regex::new(r"(?i)^\s*(warning|error|analysis failed|failed)") else {
            return stderr.lines().take(5).collect::<Vec<_>>().join("\n");
        };
        let mut lines: Vec<&str> = stdout
            .lines()
            .chain(stderr.lines())
            .filter(|l| pattern.is_match(l))
            .take(5)
            .collect();
        if lines.is_empty() && !stderr.trim().is_empty() {
            lines = stderr.lines().take(5).collect();
        }
        lines.join("\n")
    }

    pub fn parse_displacements(&self) -> Result<BTreeMap<u32, NodalDisplacement>, EngineError> {
        let mut out = BTreeMap::new();
        for (id, values) in self.parse_rows(DISPLACEMENTS_FILE, 6)? {
            out.insert(
                id,
                NodalDisplacement {
                    node_id: id,
                    ux: values[0],
                    uy: values[1],
                    uz: values[2],
                    rx: values[3],
                    ry: values[4],
                    rz: values[5],
                },
            );
        }
        debug!(nodes = out.len(), "parsed nodal displacements");
        Ok(out)
    }

    pub fn parse_reactions(&self) -> Result<BTreeMap<u32, NodalReaction>, EngineError> {
        let mut out = BTreeMap::new();
        for (id, values) in self.parse_rows(REACTIONS_FILE, 6)? {
            out.insert(
                id,
                NodalReaction {
                    node_id: id,
                    fx: values[0],
                    fy: values[1],
                    fz: values[2],
                    mx: values[3],
                    my: values[4],
                    mz: values[5],
                },
            );
        }
        debug!(nodes = out.len(), "parsed support reactions");
        Ok(out)
    }

    /// Parse per-element local end forces into two-station frame results.
    ///
    /// The solver reports forces acting on the element at both ends:
    /// `[N Vy Vz T My Mz]` for end i then end j. Internal-force diagram
    /// values flip sign where the end-force convention opposes the
    /// diagram convention, chosen so that dM3/dx = V2 and dM2/dx = V3
    /// hold along the member.
    pub fn parse_element_forces(&self) -> Result<BTreeMap<u32, FrameResult>, EngineError> {
        let mut out = BTreeMap::new();
        for (id, f) in self.parse_rows(ELEMENT_FORCES_FILE, 12)? {
            let start = FrameForces {
                location: 0.0,
                p: -f[0],
                v2: f[1],
                v3: f[2],
                t: -f[3],
                m2: f[4],
                m3: -f[5],
            };
            let end = FrameForces {
                location: 1.0,
                p: f[6],
                v2: -f[7],
                v3: -f[8],
                t: f[9],
                m2: -f[10],
                m3: f[11],
            };
            out.insert(
                id,
                FrameResult {
                    frame_id: id,
                    forces: vec![start, end],
                },
            );
        }
        debug!(frames = out.len(), "parsed element end forces");
        Ok(out)
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Read one artifact: each non-blank line is an id followed by exactly
    /// `expected` floats.
    fn parse_rows(&self, name: &str, expected: usize) -> Result<Vec<(u32, Vec<f64>)>, EngineError> {
        let path = self.file_path(name);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| EngineError::parse(name, format!("cannot read {}: {e}", path.display())))?;
        parse_rows_str(&content, name, expected)
    }
}

fn parse_rows_str(
    content: &str,
    name: &str,
    expected: usize,
) -> Result<Vec<(u32, Vec<f64>)>, EngineError> {
    let mut rows = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let id: u32 = fields
            .next()
            .ok_or_else(|| EngineError::parse(name, format!("line {}: empty row", lineno + 1)))?
            .parse()
            .map_err(|_| {
                EngineError::parse(name, format!("line {}: bad id field", lineno + 1))
            })?;
        let values: Vec<f64> = fields
            .map(|f| {
                f.parse::<f64>().map_err(|_| {
                    EngineError::parse(
                        name,
                        format!("line {}: non-numeric value '{f}'", lineno + 1),
                    )
                })
            })
            .collect::<Result<_, _>>()?;
        if values.len() != expected {
            return Err(EngineError::parse(
                name,
                format!(
                    "line {}: expected {} values, got {}",
                    lineno + 1,
                    expected,
                    values.len()
                ),
            ));
        }
        rows.push((id, values));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn success_marker_detection() {
        let parser = ResultsParser::new("/tmp");
        assert!(parser.check_analysis_success("...\nANALYSIS COMPLETE\n"));
        assert!(!parser.check_analysis_success("ANALYSIS FAILED"));
    }

    #[test]
    fn diagnostics_pick_warning_lines() {
        let parser = ResultsParser::new("/tmp");
        let stdout = "OpenSees 3.5\nWARNING analysis failed to converge\nbye\n";
        let diag = parser.extract_diagnostics(stdout, "");
        assert!(diag.contains("WARNING analysis failed"));
        assert!(!diag.contains("OpenSees 3.5"));
    }

    #[test]
    fn diagnostics_fall_back_to_stderr() {
        let parser = ResultsParser::new("/tmp");
        let diag = parser.extract_diagnostics("clean stdout", "segfault near line 3");
        assert_eq!(diag, "segfault near line 3");
    }

    #[test]
    fn parses_displacements_with_blank_lines() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(DISPLACEMENTS_FILE),
            "1 0.0 0.0 0.0 0.0 0.0 0.0\n\n2 1.0e-3 0.0 -2.5e-3 0.0 1.2e-4 0.0\n",
        )
        .unwrap();
        let parser = ResultsParser::new(dir.path());
        let disps = parser.parse_displacements().unwrap();
        assert_eq!(disps.len(), 2);
        assert_relative_eq!(disps[&2].uz, -2.5e-3);
        assert_relative_eq!(disps[&2].ry, 1.2e-4);
    }

    #[test]
    fn wrong_column_count_is_loud() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REACTIONS_FILE), "1 0.0 0.0 0.0\n").unwrap();
        let parser = ResultsParser::new(dir.path());
        let err = parser.parse_reactions().unwrap_err();
        assert!(err.to_string().contains("expected 6 values, got 3"));
    }

    #[test]
    fn non_numeric_value_is_loud() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(DISPLACEMENTS_FILE),
            "1 0.0 oops 0.0 0.0 0.0 0.0\n",
        )
        .unwrap();
        let parser = ResultsParser::new(dir.path());
        assert!(parser.parse_displacements().is_err());
    }

    #[test]
    fn missing_file_is_loud() {
        let dir = tempdir().unwrap();
        let parser = ResultsParser::new(dir.path());
        assert!(parser.parse_displacements().is_err());
    }

    #[test]
    fn end_forces_follow_diagram_sign_convention() {
        // Cantilever fixed at i, tip load F downward in local y at j:
        // element end forces N=0, Vy_i=+F, Mz_i=+F*L, Vy_j=-F, Mz_j=0
        let dir = tempdir().unwrap();
        let f = 10.0;
        let l = 5.0;
        std::fs::write(
            dir.path().join(ELEMENT_FORCES_FILE),
            format!(
                "1 0.0 {f} 0.0 0.0 0.0 {m} 0.0 {fneg} 0.0 0.0 0.0 0.0\n",
                m = f * l,
                fneg = -f
            ),
        )
        .unwrap();
        let parser = ResultsParser::new(dir.path());
        let results = parser.parse_element_forces().unwrap();
        let fr = &results[&1];
        assert_eq!(fr.forces.len(), 2);

        // Diagram: constant shear +F, hogging moment -F*L at the fixed end
        assert_relative_eq!(fr.forces[0].v2, f);
        assert_relative_eq!(fr.forces[1].v2, f);
        assert_relative_eq!(fr.forces[0].m3, -f * l);
        assert_relative_eq!(fr.forces[1].m3, 0.0);
    }

    #[test]
    fn axial_tension_is_positive_at_both_ends() {
        // Tension member with force N: N_i = -N, N_j = +N
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(ELEMENT_FORCES_FILE),
            "7 -50.0 0.0 0.0 0.0 0.0 0.0 50.0 0.0 0.0 0.0 0.0 0.0\n",
        )
        .unwrap();
        let parser = ResultsParser::new(dir.path());
        let results = parser.parse_element_forces().unwrap();
        assert_relative_eq!(results[&7].forces[0].p, 50.0);
        assert_relative_eq!(results[&7].forces[1].p, 50.0);
    }
}
