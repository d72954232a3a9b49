//! Validation of the creative deliverable, which is reviewed by hand instead of by the oracle.

use globset::Glob;
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::config::Config;
use crate::error::{GraderError, Result};
use crate::store::assignment;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CreativeFiles {
    pub movie: PathBuf,
    pub scene: PathBuf,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Finds `<uni>_t<theme>m<milestone>.*` files in the creative folder of `folder`.
///
/// Exactly one of them must be a movie and exactly one a scene.
pub fn locate_creative_files(
    folder: &Path,
    uni: &str,
    assignment: &assignment::Model,
    config: &Config,
) -> Result<CreativeFiles> {
    let pattern = format!("{uni}_t{}m{}.*", assignment.theme, assignment.milestone);
    let matcher = Glob::new(&pattern)
        .map_err(|e| GraderError::CreativeFiles(format!("invalid file pattern '{pattern}': {e}")))?
        .compile_matcher();

    let creative = folder.join(&config.creative_dir);
    let mut movies = vec![];
    let mut scenes = vec![];
    for entry in fs::read_dir(&creative)? {
        let path = entry?.path();
        let Some(name) = path.file_name() else {
            continue;
        };
        if !path.is_file() || !matcher.is_match(name) {
            continue;
        }
        let Some(ext) = extension_of(&path) else {
            continue;
        };
        if config.movie_extensions.contains(&ext) {
            movies.push(path);
        } else if ext == config.scene_extension {
            scenes.push(path);
        }
    }
    debug!("creative folder: {} movie(s), {} scene(s)", movies.len(), scenes.len());

    let mut problems = vec![];
    match movies.len() {
        0 => problems.push("Failed to find a movie file in your Creative directory.".to_string()),
        1 => {}
        n => problems.push(format!(
            "Found {n} movie files matching '{pattern}' in your Creative directory; expected one."
        )),
    }
    match scenes.len() {
        0 => problems.push("Failed to find a scene file in your Creative directory.".to_string()),
        1 => {}
        n => problems.push(format!(
            "Found {n} scene files matching '{pattern}' in your Creative directory; expected one."
        )),
    }
    if !problems.is_empty() {
        return Err(GraderError::CreativeFiles(problems.join(" ")));
    }

    Ok(CreativeFiles {
        movie: movies.remove(0),
        scene: scenes.remove(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn t2m1() -> assignment::Model {
        assignment::Model {
            id: 1,
            theme: 2,
            milestone: 1,
            deliverable: 3,
            oracle_path: String::new(),
            template_path: String::new(),
            start_date: NaiveDateTime::default(),
            due_date: NaiveDateTime::default(),
        }
    }

    fn folder_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let creative = dir.path().join("Creative");
        fs::create_dir_all(&creative).unwrap();
        for f in files {
            fs::write(creative.join(f), "").unwrap();
        }
        dir
    }

    #[test]
    fn should_identify_one_movie_and_one_scene() {
        let dir = folder_with(&["abc123_t2m1.mp4", "abc123_t2m1.xml", "readme.txt"]);
        let found =
            locate_creative_files(dir.path(), "abc123", &t2m1(), &Config::default()).unwrap();
        assert_eq!(found.movie.file_name().unwrap(), "abc123_t2m1.mp4");
        assert_eq!(found.scene.file_name().unwrap(), "abc123_t2m1.xml");
    }

    #[test]
    fn should_reject_two_movies_and_no_scene() {
        let dir = folder_with(&["abc123_t2m1.mp4", "abc123_t2m1.mov"]);
        match locate_creative_files(dir.path(), "abc123", &t2m1(), &Config::default()) {
            Err(GraderError::CreativeFiles(msg)) => {
                assert!(msg.contains("Found 2 movie files"));
                assert!(msg.contains("Failed to find a scene file"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_ignore_files_of_other_students_or_milestones() {
        let dir = folder_with(&["xyz999_t2m1.mp4", "abc123_t2m2.xml", "abc123_t2m1.xml"]);
        match locate_creative_files(dir.path(), "abc123", &t2m1(), &Config::default()) {
            Err(GraderError::CreativeFiles(msg)) => {
                assert_eq!(msg, "Failed to find a movie file in your Creative directory.")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
