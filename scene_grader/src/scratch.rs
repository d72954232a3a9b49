//! The private copy of a submission: layout checks, preparation, build and removal.

use log::{debug, error, info, warn};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::Command,
};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{GraderError, Result};
use crate::grader::os_interface::ExecutableArtifact;
use crate::store::assignment;

/// Changes the process working directory until dropped, then restores the previous one.
pub struct ScopedWorkdir {
    previous: PathBuf,
}

impl ScopedWorkdir {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        debug!("entered '{}'", dir.display());
        Ok(Self { previous })
    }
}

impl Drop for ScopedWorkdir {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            error!("could not return to '{}': {err}", self.previous.display());
        }
    }
}

/// A raw submission must contain both the code folder and the creative folder.
pub fn check_original_folder(original: &Path, config: &Config) -> Result<()> {
    if !original.is_dir() {
        return Err(GraderError::MissingFolder(original.to_path_buf()));
    }
    for required in [&config.code_dir, &config.creative_dir] {
        if !original.join(required).is_dir() {
            return Err(GraderError::MissingSubfolder(required.clone()));
        }
    }
    Ok(())
}

/// `<submissions>/t<theme>m<milestone>/<uni>-<name>-<uuid>/`, absolute. Parents are created,
/// the folder itself is not.
pub fn submission_folder_path(
    config: &Config,
    assignment: &assignment::Model,
    uni: &str,
) -> Result<PathBuf> {
    let parent = config
        .submissions_dir
        .join(format!("t{}m{}", assignment.theme, assignment.milestone));
    fs::create_dir_all(&parent)?;
    let parent = fs::canonicalize(parent)?;
    Ok(parent.join(format!("{uni}-{}-{}", assignment.name(), Uuid::new_v4())))
}

/// Copies everything under `src` into `dst`, creating directories as needed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|source| GraderError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| GraderError::Io(io::Error::other(e)))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Template first, then the student's code and creative folders on top of it.
pub fn prepare_submission_folder(
    original: &Path,
    folder: &Path,
    assignment: &assignment::Model,
    config: &Config,
) -> Result<()> {
    let template = Path::new(&assignment.template_path);
    if !template.is_dir() {
        return Err(GraderError::MissingTemplate(template.to_path_buf()));
    }
    info!("preparing '{}'", folder.display());
    copy_tree(template, folder)?;
    for sub in [&config.code_dir, &config.creative_dir] {
        copy_tree(&original.join(sub), &folder.join(sub))?;
    }
    Ok(())
}

fn run_build_step(line: &str) -> Result<bool> {
    let parts = shlex::split(line).ok_or_else(|| GraderError::InvalidCommand(line.to_string()))?;
    let Some((program, args)) = parts.split_first() else {
        return Err(GraderError::InvalidCommand(line.to_string()));
    };
    debug!("running build step '{line}'");
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        warn!("build step '{line}' exited with {status}");
    }
    Ok(status.success())
}

/// Configures and builds inside `<folder>/build/` and returns the produced binary.
pub fn compile_submission(folder: &Path, config: &Config) -> Result<ExecutableArtifact> {
    let build_dir = folder.join("build");
    if !build_dir.exists() {
        fs::create_dir_all(&build_dir)?;
    }
    if !build_dir.is_dir() {
        return Err(GraderError::MissingBuildDirectory);
    }

    let _workdir = ScopedWorkdir::enter(&build_dir)?;
    for step in [&config.configure_command, &config.build_command] {
        if !run_build_step(step)? {
            return Err(GraderError::BuildFailed);
        }
    }

    let binary = build_dir.join(&config.binary_path);
    let name = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ExecutableArtifact::build(name, &binary).map_err(|err| {
        debug!("{err}");
        GraderError::MissingBinary(binary.clone())
    })
}

/// Removes the scratch copy. A folder that is already gone is not an error.
pub fn remove_submission_folder(folder: &Path) -> io::Result<()> {
    match fs::remove_dir_all(folder) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
