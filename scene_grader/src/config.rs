//! Runtime settings of the grader.
//!
//! A [`Config`] is built once by the binary and handed down by reference; nothing in the
//! library reads the environment on its own.

use chrono::Duration;
use log::warn;
use std::{collections::HashMap, env, path::PathBuf};

/// Deliverable number reserved for the creative scene.
pub const DEFAULT_CREATIVE_DELIVERABLE: i32 = 3;
/// Hours after the due date during which a submission is still accepted.
pub const DEFAULT_LATE_WINDOW_HOURS: i64 = 10;

const PREFIX: &str = "GRADER_";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Parent of every scratch copy made for a submission.
    pub submissions_dir: PathBuf,
    /// Where executor output and residual files are written.
    pub work_dir: PathBuf,
    pub late_window: Duration,
    pub creative_deliverable: i32,
    pub scene_extension: String,
    pub movie_extensions: Vec<String>,
    /// Required top-level folder holding the graded code.
    pub code_dir: String,
    /// Required top-level folder holding the creative scene and its movie.
    pub creative_dir: String,
    /// Location of the compiled submission, relative to `build/`.
    pub binary_path: PathBuf,
    pub configure_command: String,
    pub build_command: String,
    pub asset_root: PathBuf,
    pub hidden_asset_root: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./testgrade.db"),
            submissions_dir: PathBuf::from("./submissions"),
            work_dir: PathBuf::from("."),
            late_window: Duration::hours(DEFAULT_LATE_WINDOW_HOURS),
            creative_deliverable: DEFAULT_CREATIVE_DELIVERABLE,
            scene_extension: ".xml".to_string(),
            movie_extensions: [".mpeg", ".mpg", ".mov", ".mkv", ".avi", ".mp4"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            code_dir: "FOSSSim".to_string(),
            creative_dir: "Creative".to_string(),
            binary_path: PathBuf::from("FOSSSim/FOSSSim"),
            configure_command: "cmake -DCMAKE_BUILD_TYPE=Release ..".to_string(),
            build_command: "make -j".to_string(),
            asset_root: PathBuf::from("/home/cs4167/assets"),
            hidden_asset_root: PathBuf::from("/home/cs4167/grading/hiddenassets"),
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and applies every `GRADER_*` variable on top of the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(PREFIX).map(|k| (k.to_string(), v)))
            .collect();
        let mut config = Self::default();

        if let Some(v) = vars.get("DATABASE") {
            config.database_path = PathBuf::from(v);
        }
        if let Some(v) = vars.get("SUBMISSIONS_DIR") {
            config.submissions_dir = PathBuf::from(v);
        }
        if let Some(v) = vars.get("WORK_DIR") {
            config.work_dir = PathBuf::from(v);
        }
        if let Some(hours) = parse_var::<i64>(&vars, "LATE_WINDOW_HOURS") {
            config.late_window = Duration::hours(hours);
        }
        if let Some(n) = parse_var::<i32>(&vars, "CREATIVE_DELIVERABLE") {
            config.creative_deliverable = n;
        }
        if let Some(v) = vars.get("SCENE_EXTENSION") {
            config.scene_extension = v.clone();
        }
        if let Some(v) = vars.get("CONFIGURE_COMMAND") {
            config.configure_command = v.clone();
        }
        if let Some(v) = vars.get("BUILD_COMMAND") {
            config.build_command = v.clone();
        }
        if let Some(v) = vars.get("BINARY_PATH") {
            config.binary_path = PathBuf::from(v);
        }
        if let Some(v) = vars.get("ASSET_ROOT") {
            config.asset_root = PathBuf::from(v);
        }
        if let Some(v) = vars.get("HIDDEN_ASSET_ROOT") {
            config.hidden_asset_root = PathBuf::from(v);
        }
        if let Some(v) = vars.get("LOG_LEVEL") {
            config.log_level = v.clone();
        }
        if let Some(v) = vars.get("LOG_FILE") {
            config.log_file = Some(PathBuf::from(v));
        }
        config
    }

    /// Default directory of visible scenes for one deliverable of a theme/milestone.
    pub fn asset_directory(&self, theme: i32, milestone: i32, deliverable: i32) -> String {
        asset_path(&self.asset_root, theme, milestone, deliverable)
    }

    pub fn hidden_asset_directory(&self, theme: i32, milestone: i32, deliverable: i32) -> String {
        asset_path(&self.hidden_asset_root, theme, milestone, deliverable)
    }
}

fn asset_path(root: &std::path::Path, theme: i32, milestone: i32, deliverable: i32) -> String {
    format!(
        "{}/t{theme}m{milestone}/Deliverable{deliverable}/",
        root.display().to_string().trim_end_matches('/')
    )
}

fn parse_var<T: std::str::FromStr>(vars: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = vars.get(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {PREFIX}{key}='{raw}': not a valid number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn should_use_documented_defaults() {
        let config = Config::from_vars(vec![]);
        assert_eq!(config, Config::default());
        assert_eq!(config.late_window, Duration::hours(10));
        assert_eq!(config.creative_deliverable, 3);
        assert_eq!(config.scene_extension, ".xml");
    }

    #[test]
    fn should_override_from_prefixed_vars() {
        let config = Config::from_vars(vars(&[
            ("GRADER_DATABASE", "/tmp/grades.db"),
            ("GRADER_LATE_WINDOW_HOURS", "24"),
            ("GRADER_BUILD_COMMAND", "ninja"),
            ("DATABASE", "ignored"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/grades.db"));
        assert_eq!(config.late_window, Duration::hours(24));
        assert_eq!(config.build_command, "ninja");
    }

    #[test_log::test]
    fn should_keep_default_on_invalid_number() {
        let config = Config::from_vars(vars(&[("GRADER_CREATIVE_DELIVERABLE", "three")]));
        assert_eq!(config.creative_deliverable, DEFAULT_CREATIVE_DELIVERABLE);
    }

    #[test]
    fn should_format_default_asset_paths() {
        let config = Config::default();
        assert_eq!(
            config.asset_directory(2, 1, 1),
            "/home/cs4167/assets/t2m1/Deliverable1/"
        );
        assert_eq!(
            config.hidden_asset_directory(2, 1, 2),
            "/home/cs4167/grading/hiddenassets/t2m1/Deliverable2/"
        );
    }
}
