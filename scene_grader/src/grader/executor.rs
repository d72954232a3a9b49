//! Running one scene through the submission and then through the oracle.
//!
//! Both programs follow the same calling convention:
//! - submission: `<binary> -s <scene> -d 0 -o <output>`
//! - oracle: `<oracle> -s <scene> -d 0 -i <output>`
//!
//! The oracle prints [`PASS_MARKER`] or [`FAIL_MARKER`] on stdout. It may leave a
//! [`RESIDUAL_FILE`] behind in its working directory.

use log::{debug, info, warn};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process::Stdio,
};

use crate::discovery::TestScene;
use crate::grader::os_interface::ExecutableArtifact;
use crate::store::test_run::Verdict;

pub const PASS_MARKER: &str = "Overall success: Passed";
pub const FAIL_MARKER: &str = "Overall success: Failed";
pub const RESIDUAL_FILE: &str = "residual.txt";
/// Value of `-d`: disables randomness in the simulation.
const DETERMINISTIC_MODE: &str = "0";

/// Why a scene produced no verdict.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Indeterminate {
    /// The submission could not be launched at all.
    NotLaunched(String),
    /// The submission exited unsuccessfully; `None` when killed by a signal.
    Crashed(Option<i32>),
    MissingOutput(PathBuf),
    MissingOracle(PathBuf),
    OracleNotLaunched(String),
    /// The oracle ran but printed neither marker.
    NoVerdict,
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indeterminate::NotLaunched(err) => {
                write!(f, "Student executable could not be started ({err}).")
            }
            Indeterminate::Crashed(Some(code)) => {
                write!(f, "Student executable crashed (exit code {code}).")
            }
            Indeterminate::Crashed(None) => {
                write!(f, "Student executable crashed (killed by a signal).")
            }
            Indeterminate::MissingOutput(path) => {
                write!(f, "Failed to generate output file '{}'.", path.display())
            }
            Indeterminate::MissingOracle(path) => {
                write!(f, "Failed to open oracle '{}'.", path.display())
            }
            Indeterminate::OracleNotLaunched(err) => {
                write!(f, "Oracle could not be started ({err}).")
            }
            Indeterminate::NoVerdict => write!(f, "Couldn't determine result of test."),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SceneOutcome {
    Passed,
    Failed,
    Indeterminate(Indeterminate),
}

impl SceneOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            SceneOutcome::Passed => Verdict::Pass,
            SceneOutcome::Failed => Verdict::Fail,
            SceneOutcome::Indeterminate(_) => Verdict::Indeterminate,
        }
    }
}

/// Reads the oracle's verdict out of its stdout.
pub fn classify(oracle_stdout: &str) -> SceneOutcome {
    if oracle_stdout.contains(PASS_MARKER) {
        SceneOutcome::Passed
    } else if oracle_stdout.contains(FAIL_MARKER) {
        SceneOutcome::Failed
    } else {
        SceneOutcome::Indeterminate(Indeterminate::NoVerdict)
    }
}

/// Files a scene run may leave in the work directory. Removed on drop, whatever happened.
struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => debug!("removed scratch file '{}'", path.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!("could not remove '{}': {err}", path.display()),
            }
        }
    }
}

/// Relative paths are resolved against the grader's cwd, not the children's.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Runs scenes for one submission against one oracle.
#[derive(Debug, Clone)]
pub struct SceneExecutor {
    submission: ExecutableArtifact,
    oracle: PathBuf,
    work_dir: PathBuf,
    run_id: String,
}

impl SceneExecutor {
    /// `run_id` keeps the output file name unique to this grading run.
    pub fn new(
        submission: ExecutableArtifact,
        oracle: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            submission,
            oracle: absolute(&oracle.into()),
            work_dir: absolute(&work_dir.into()),
            run_id: run_id.into(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(format!("output_{}.bin", self.run_id))
    }

    pub fn residual_path(&self) -> PathBuf {
        self.work_dir.join(RESIDUAL_FILE)
    }

    /// Never fails: anything that prevents a verdict becomes [`SceneOutcome::Indeterminate`].
    pub fn run(&self, scene: &TestScene) -> SceneOutcome {
        let output = self.output_path();
        let _scratch = ScratchFiles {
            paths: vec![output.clone(), self.residual_path()],
        };
        info!("🚀 Running scene '{}'", scene.path.display());
        let scene_path = absolute(&scene.path);

        if let Err(reason) = self.run_submission(&scene_path, &output) {
            warn!("❌ {reason}");
            return SceneOutcome::Indeterminate(reason);
        }

        let oracle = match ExecutableArtifact::build("oracle", &self.oracle) {
            Ok(oracle) => oracle,
            Err(err) => {
                warn!("oracle '{}' unusable: {err}", self.oracle.display());
                return SceneOutcome::Indeterminate(Indeterminate::MissingOracle(
                    self.oracle.clone(),
                ));
            }
        };

        let stdout = match self.run_oracle(&oracle, &scene_path, &output) {
            Ok(stdout) => stdout,
            Err(reason) => {
                warn!("❌ {reason}");
                return SceneOutcome::Indeterminate(reason);
            }
        };
        let outcome = classify(&stdout);
        info!("verdict for '{}': {:?}", scene.path.display(), outcome);
        outcome
    }

    fn run_submission(&self, scene: &Path, output: &Path) -> Result<(), Indeterminate> {
        let mut cmd = self.submission.new_cmd();
        cmd.arg("-s")
            .arg(scene)
            .args(["-d", DETERMINISTIC_MODE])
            .arg("-o")
            .arg(output)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        debug!("Configured command '{cmd:?}'");

        let status = cmd
            .status()
            .map_err(|err| Indeterminate::NotLaunched(err.to_string()))?;
        if !status.success() {
            return Err(Indeterminate::Crashed(status.code()));
        }
        if !output.is_file() {
            return Err(Indeterminate::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }

    fn run_oracle(
        &self,
        oracle: &ExecutableArtifact,
        scene: &Path,
        output: &Path,
    ) -> Result<String, Indeterminate> {
        let mut cmd = oracle.new_cmd();
        cmd.arg("-s")
            .arg(scene)
            .args(["-d", DETERMINISTIC_MODE])
            .arg("-i")
            .arg(output)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        debug!("Configured command '{cmd:?}'");

        let result = cmd
            .output()
            .map_err(|err| Indeterminate::OracleNotLaunched(err.to_string()))?;
        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        if !stdout.is_empty() {
            debug!("- STDOUT: '{}'", stdout.replace('\n', "\\n"));
        }
        Ok(stdout)
    }
}
