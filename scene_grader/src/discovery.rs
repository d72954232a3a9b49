//! Finding the scene files that make up an assignment's test suite.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One scene to run. Never persisted: recomputed from the asset directories on every run.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct TestScene {
    pub path: PathBuf,
    pub graded: bool,
    pub hidden: bool,
}

impl TestScene {
    pub fn new(path: PathBuf, graded: bool, hidden: bool) -> Self {
        Self {
            path,
            graded,
            hidden,
        }
    }

    /// The last three components of the path, enough to tell scenes apart on screen.
    pub fn short_name(&self) -> String {
        let parts: Vec<_> = self
            .path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let start = parts.len().saturating_sub(3);
        parts[start..].join("/")
    }
}

/// Every file below `root` (recursively) whose extension is `extension` (".xml" or "xml").
///
/// A missing root yields no scenes. Entries are visited in file-name order so that two scans
/// of an unchanged tree agree.
pub fn scan(
    root: impl AsRef<Path>,
    extension: &str,
    graded: bool,
    hidden: bool,
) -> Vec<TestScene> {
    let root = root.as_ref();
    if !root.exists() {
        debug!("asset directory '{}' does not exist", root.display());
        return vec![];
    }
    let wanted = extension.trim_start_matches('.');

    let mut scenes = vec![];
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry under '{}': {err}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == wanted) {
            scenes.push(TestScene::new(entry.into_path(), graded, hidden));
        }
    }
    debug!("found {} scene(s) in '{}'", scenes.len(), root.display());
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, fs};

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("one.xml"), "<scene/>").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("a/two.xml"), "<scene/>").unwrap();
        fs::write(root.join("a/b/three.xml"), "<scene/>").unwrap();
        fs::write(root.join("a/b/three.xml.bak"), "").unwrap();
        fs::create_dir_all(root.join("dir.xml")).unwrap();
        dir
    }

    #[test]
    fn should_find_scene_files_recursively() {
        let dir = tree();
        let found: HashSet<_> = scan(dir.path(), ".xml", true, false)
            .into_iter()
            .map(|s| s.path)
            .collect();
        let expected: HashSet<_> = ["one.xml", "a/two.xml", "a/b/three.xml"]
            .iter()
            .map(|p| dir.path().join(p))
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn should_tag_scenes_with_directory_flags() {
        let dir = tree();
        let scenes = scan(dir.path(), "xml", false, true);
        assert_eq!(scenes.len(), 3);
        assert!(scenes.iter().all(|s| !s.graded && s.hidden));
    }

    #[test]
    fn should_be_stable_across_scans() {
        let dir = tree();
        assert_eq!(
            scan(dir.path(), ".xml", true, false),
            scan(dir.path(), ".xml", true, false)
        );
    }

    #[test]
    fn should_yield_nothing_for_missing_directory() {
        assert!(scan("/definitely/not/here", ".xml", true, false).is_empty());
    }

    #[test]
    fn should_shorten_scene_path() {
        let scene = TestScene::new(
            PathBuf::from("/home/cs4167/assets/t1m1/Deliverable1/spring.xml"),
            true,
            false,
        );
        assert_eq!(scene.short_name(), "t1m1/Deliverable1/spring.xml");
        let scene = TestScene::new(PathBuf::from("spring.xml"), true, false);
        assert_eq!(scene.short_name(), "spring.xml");
    }
}
