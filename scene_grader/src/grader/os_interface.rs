//! The boundary between the grader and the programs it runs: the compiled submission and the
//! oracle.

use is_executable::is_executable;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    process::Command,
};

/// A program the grader is allowed to launch.
///
/// # Caveats
/// - Building an artifact only checks that the path is executable at that moment. The file may
///   still vanish before it is launched, so spawning can fail later anyway.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ExecutableArtifact {
    CompiledProgram { name: String, path: PathBuf },
}

impl ExecutableArtifact {
    pub fn build(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, &'static str> {
        let path = path.as_ref();
        if !path.is_file() || !is_executable(path) {
            return Err("path does not point to an executable");
        }
        Ok(ExecutableArtifact::CompiledProgram {
            name: name.into(),
            path: path.to_path_buf(),
        })
    }

    pub fn new_cmd(&self) -> Command {
        match self {
            ExecutableArtifact::CompiledProgram { path, .. } => Command::new(path),
        }
    }

    pub fn name(&self) -> String {
        match self {
            ExecutableArtifact::CompiledProgram { name, .. } => name.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ExecutableArtifact::CompiledProgram { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;

    #[test]
    fn should_build_a_valid_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = utils::write_script(dir.path(), "prog", "exit 0");
        let artifact = ExecutableArtifact::build("some name", &path).unwrap();
        assert_eq!(artifact.name(), "some name");
        assert_eq!(artifact.path(), path);
        assert_eq!(artifact.new_cmd().get_program(), path.as_os_str());
    }

    #[test]
    fn should_fail_to_build_an_invalid_executable() {
        assert!(ExecutableArtifact::build("some name", "invalid_path").is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(ExecutableArtifact::build("a directory", dir.path()).is_err());

        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, "not a program").unwrap();
        assert!(ExecutableArtifact::build("plain", &plain).is_err());
    }
}
