//! OpenSees binary adapter.
//!
//! Drives the OpenSees executable as a child process: writes the Tcl
//! script, runs `OpenSees model.tcl` with a hard wall-clock timeout, and
//! captures stdout/stderr verbatim into sibling files for post-mortem
//! inspection. Every failure mode surfaces as a non-converged run with a
//! diagnostic string; `run_analysis` never errors.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::catalog::{MaterialMap, SectionMap};
use crate::engine::{AnalysisEngine, ProgressFn, ResultsParser, TclWriter};
use crate::error::EngineError;
use crate::loads::{DistributedLoad, LoadCase, NodalLoad, PointLoadOnFrame};
use crate::model::StructuralModel;
use crate::results::AnalysisResults;

/// Hard wall-clock limit for one solver run
pub const ANALYSIS_TIMEOUT_SECS: u64 = 300;

const STDOUT_FILE: &str = "opensees_stdout.txt";
const STDERR_FILE: &str = "opensees_stderr.txt";

/// Locate the OpenSees executable.
///
/// Checks the `OPENSEES_EXE` environment variable, then `OpenSees` on
/// PATH, then a short list of conventional install locations.
pub fn find_opensees_executable() -> Result<PathBuf, EngineError> {
    if let Ok(exe) = env::var("OPENSEES_EXE") {
        if !exe.is_empty() {
            let path = PathBuf::from(&exe);
            if path.exists() {
                return Ok(path);
            }
            if let Some(found) = search_path(&exe) {
                return Ok(found);
            }
        }
    }

    if let Some(found) = search_path("OpenSees") {
        return Ok(found);
    }

    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/OpenSees"),
        PathBuf::from("/opt/homebrew/bin/OpenSees"),
    ];
    if let Some(home) = env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join("OpenSees").join("bin").join("OpenSees"));
    }
    if cfg!(windows) {
        candidates.push(PathBuf::from(r"C:\OpenSees\bin\OpenSees.exe"));
    }
    candidates
        .into_iter()
        .find(|p| p.exists())
        .ok_or(EngineError::ExecutableNotFound)
}

/// PATH lookup for a bare executable name
fn search_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    for dir in env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let with_ext = dir.join(format!("{name}.exe"));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }
    None
}

/// [`AnalysisEngine`] implementation backed by the OpenSees binary.
///
/// Holds per-run state and a scoped working directory, so one instance
/// serves one analysis at a time. The working directory is a fresh temp
/// dir unless the caller supplies one, and is removed on [`clear`] or
/// drop (best effort).
///
/// [`clear`]: AnalysisEngine::clear
pub struct OpenSeesAdapter {
    work_dir: Option<PathBuf>,
    temp_dir: Option<TempDir>,
    timeout: Duration,
    model_built: bool,
    script_path: Option<PathBuf>,
    start_time: Option<Instant>,
    stdout: String,
    stderr: String,
    analysis_complete: bool,
    model: Option<StructuralModel>,
    materials: MaterialMap,
    sections: SectionMap,
}

impl Default for OpenSeesAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSeesAdapter {
    pub fn new() -> Self {
        Self {
            work_dir: None,
            temp_dir: None,
            timeout: Duration::from_secs(ANALYSIS_TIMEOUT_SECS),
            model_built: false,
            script_path: None,
            start_time: None,
            stdout: String::new(),
            stderr: String::new(),
            analysis_complete: false,
            model: None,
            materials: MaterialMap::new(),
            sections: SectionMap::new(),
        }
    }

    /// Use a caller-supplied working directory instead of a temp dir.
    /// The caller keeps ownership; it is not removed on `clear`.
    pub fn with_work_dir(dir: impl Into<PathBuf>) -> Self {
        let mut adapter = Self::new();
        adapter.work_dir = Some(dir.into());
        adapter
    }

    /// Override the solver wall-clock deadline (default
    /// [`ANALYSIS_TIMEOUT_SECS`]). Survives `clear`.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Captured solver stdout from the last run
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured solver stderr (or internal diagnostic) from the last run
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    fn ensure_work_dir(&mut self) -> Result<&Path, EngineError> {
        if self.work_dir.is_none() {
            let temp = tempfile::Builder::new().prefix("opensees_run_").tempdir()?;
            self.work_dir = Some(temp.path().to_path_buf());
            self.temp_dir = Some(temp);
        }
        match &self.work_dir {
            Some(dir) => Ok(dir),
            None => Err(EngineError::NotReady("working directory unavailable")),
        }
    }

    /// Run the child process with the wall-clock timeout, streaming output
    /// to the capture files. Polls rather than blocking so the deadline
    /// can kill a hung solver.
    fn run_with_timeout(&mut self, exe: &Path, script: &Path) -> Result<i32, EngineError> {
        let dir = match &self.work_dir {
            Some(dir) => dir.clone(),
            None => return Err(EngineError::NotReady("working directory unavailable")),
        };
        let stdout_file = File::create(dir.join(STDOUT_FILE))?;
        let stderr_file = File::create(dir.join(STDERR_FILE))?;

        debug!(exe = %exe.display(), script = %script.display(), "spawning solver");
        let mut child = Command::new(exe)
            .arg(script)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .spawn()?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if Instant::now() >= deadline {
                        warn!(timeout = ?self.timeout, "solver exceeded deadline, killing");
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(EngineError::Timeout(self.timeout.as_secs()));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        };

        self.stdout = std::fs::read_to_string(dir.join(STDOUT_FILE)).unwrap_or_default();
        self.stderr = std::fs::read_to_string(dir.join(STDERR_FILE)).unwrap_or_default();
        Ok(status.code().unwrap_or(-1))
    }

    fn elapsed_secs(&self) -> f64 {
        self.start_time.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0)
    }
}

impl AnalysisEngine for OpenSeesAdapter {
    fn build_model(
        &mut self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
    ) -> Result<(), EngineError> {
        self.start_time = Some(Instant::now());
        self.model = Some(model.clone());
        self.materials = materials.clone();
        self.sections = sections.clone();
        self.model_built = true;
        Ok(())
    }

    fn apply_loads(
        &mut self,
        load_case: &LoadCase,
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
    ) -> Result<(), EngineError> {
        if !self.model_built {
            return Err(EngineError::NotReady("model must be built before applying loads"));
        }
        let dir = self.ensure_work_dir()?.to_path_buf();
        let writer = TclWriter::new(&dir);
        let model = self
            .model
            .as_ref()
            .ok_or(EngineError::NotReady("model must be built before applying loads"))?;
        let path = writer.write_model(
            model,
            &self.materials,
            &self.sections,
            load_case,
            nodal_loads,
            distributed_loads,
            point_loads,
        )?;
        self.script_path = Some(path);
        Ok(())
    }

    fn run_analysis(&mut self, progress: Option<&ProgressFn>) -> bool {
        let Some(script) = self.script_path.clone() else {
            self.stderr = "Loads must be applied before running analysis".to_string();
            self.analysis_complete = false;
            return false;
        };

        if let Some(cb) = progress {
            cb(1, 3, "Finding OpenSees executable...");
        }
        let exe = match find_opensees_executable() {
            Ok(exe) => exe,
            Err(e) => {
                warn!("{e}");
                self.stderr = e.to_string();
                self.analysis_complete = false;
                return false;
            }
        };

        if let Some(cb) = progress {
            cb(2, 3, "Running OpenSees analysis...");
        }
        let code = match self.run_with_timeout(&exe, &script) {
            Ok(code) => code,
            Err(e) => {
                error!("solver run failed: {e}");
                self.stderr = e.to_string();
                self.analysis_complete = false;
                return false;
            }
        };
        if code != 0 {
            info!(exit_code = code, "solver exited with non-zero status");
            self.analysis_complete = false;
            return false;
        }

        if let Some(cb) = progress {
            cb(3, 3, "Analysis complete");
        }
        let complete = match &self.work_dir {
            Some(dir) => ResultsParser::new(dir).check_analysis_success(&self.stdout),
            None => false,
        };
        self.analysis_complete = complete;
        complete
    }

    fn get_results(&mut self, load_case: &LoadCase) -> AnalysisResults {
        let mut results = AnalysisResults::new(load_case.id);
        results.success = self.analysis_complete;
        results.analysis_time_seconds = self.elapsed_secs();

        let Some(dir) = self.work_dir.clone() else {
            results.success = false;
            results.error_message = "No analysis has been run".to_string();
            return results;
        };
        let parser = ResultsParser::new(&dir);

        if !self.analysis_complete {
            let diag = parser.extract_diagnostics(&self.stdout, &self.stderr);
            results.error_message = if diag.is_empty() {
                "Analysis did not converge".to_string()
            } else {
                diag
            };
            return results;
        }

        let parsed = parser.parse_displacements().and_then(|disps| {
            let reactions = parser.parse_reactions()?;
            let forces = parser.parse_element_forces()?;
            Ok((disps, reactions, forces))
        });
        match parsed {
            Ok((disps, reactions, forces)) => {
                results.displacements = disps;
                results.reactions = reactions;
                results.frame_results = forces;
            }
            Err(e) => {
                error!("failed to parse solver output: {e}");
                return AnalysisResults::failed(
                    load_case.id,
                    format!("Failed to extract results: {e}"),
                );
            }
        }
        results
    }

    fn clear(&mut self) {
        self.model_built = false;
        self.script_path = None;
        self.start_time = None;
        self.stdout.clear();
        self.stderr.clear();
        self.analysis_complete = false;
        self.model = None;
        self.materials.clear();
        self.sections.clear();
        // Dropping the TempDir removes it; failures are ignored
        if self.temp_dir.take().is_some() {
            self.work_dir = None;
        }
    }
}
