use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can stop a grader command.
///
/// Per-scene problems (a crashing submission, a missing oracle, ...) are not errors: they
/// degrade a single result to indeterminate, see [`crate::grader::executor::SceneOutcome`].
#[derive(Debug, Error)]
pub enum GraderError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("input was closed before an answer was given")]
    InputClosed,

    #[error("could not read input: {0}")]
    Prompt(String),

    #[error("Folder '{0}' does not exist.")]
    MissingFolder(PathBuf),

    #[error("Couldn't find '{0}' directory in the top level of the submission folder.")]
    MissingSubfolder(String),

    #[error("Couldn't find assignment starter code at '{0}'.")]
    MissingTemplate(PathBuf),

    #[error("Build directory was not correctly copied into the submission folder.")]
    MissingBuildDirectory,

    #[error("Compilation failed.")]
    BuildFailed,

    #[error("Binary executable wasn't found in '{0}'.")]
    MissingBinary(PathBuf),

    #[error("{0}")]
    CreativeFiles(String),

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid command line '{0}'")]
    InvalidCommand(String),

    #[error("'{0}' is not a valid UNI (letters, digits, '-' and '_' only).")]
    InvalidUni(String),

    #[error("Failed to create new student with UNI {0}.")]
    StudentCreation(String),

    #[error("no assignment named '{0}'")]
    UnknownAssignment(String),
}

impl GraderError {
    /// Whether the error comes from the environment (layout, template, toolchain) rather than
    /// from a bug or an I/O failure inside the grader itself.
    pub fn is_fatal_environment(&self) -> bool {
        matches!(
            self,
            GraderError::MissingFolder(_)
                | GraderError::MissingSubfolder(_)
                | GraderError::MissingTemplate(_)
                | GraderError::MissingBuildDirectory
                | GraderError::BuildFailed
                | GraderError::MissingBinary(_)
                | GraderError::CreativeFiles(_)
                | GraderError::InvalidUni(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GraderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_environment_errors() {
        assert!(GraderError::BuildFailed.is_fatal_environment());
        assert!(GraderError::MissingSubfolder("Creative".to_string()).is_fatal_environment());
        assert!(!GraderError::InputClosed.is_fatal_environment());
        assert!(!GraderError::Io(io::Error::other("boom")).is_fatal_environment());
    }

    #[test]
    fn should_render_operator_messages() {
        assert_eq!(
            GraderError::MissingTemplate(PathBuf::from("/tmp/t")).to_string(),
            "Couldn't find assignment starter code at '/tmp/t'."
        );
        assert_eq!(GraderError::BuildFailed.to_string(), "Compilation failed.");
    }
}
