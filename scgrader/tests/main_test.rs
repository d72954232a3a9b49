use assert_cmd::Command;
use std::{fs, path::Path};

const EXECUTABLE_NAME: &str = "scgrader";

fn scgrader(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(EXECUTABLE_NAME).unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("GRADER_DATABASE", dir.join("grader.db"))
        .env("GRADER_SUBMISSIONS_DIR", dir.join("submissions"))
        .env("GRADER_LOG_LEVEL", "off");
    cmd
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn should_describe_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let help = stdout_of(scgrader(dir.path()).arg("--help").assert().success());
    for sub in ["submit", "define", "list", "grades", "import", "export"] {
        assert!(help.contains(sub), "missing {sub} in\n{help}");
    }
}

#[test]
fn should_export_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("assignments.json");

    let text = stdout_of(scgrader(dir.path()).arg("export").arg(&out).assert().success());
    assert!(text.starts_with("Exported 0 assignment(s)"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "[]\n");
}

#[test]
fn should_import_then_list_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("in.json");
    fs::write(
        &file,
        r#"[{ "theme": 2, "milestone": 1, "deliverable": 1, "oracle_path": "/o",
  "template_path": "/t", "start_date": "2024-01-01", "due_date": "2024-01-10",
  "asset_directories": [{ "path": "/scenes", "graded": true, "hidden": false }] }]"#,
    )
    .unwrap();

    scgrader(dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout("Imported 1 assignment(s).\n");
    let listing = stdout_of(scgrader(dir.path()).arg("list").assert().success());
    assert!(listing.starts_with("<Assignment t2m1d1"));
    assert!(listing.contains("\t<AssetDirectory '/scenes' Graded>"));
}

#[test]
fn should_fail_on_missing_submission_folder() {
    let dir = tempfile::tempdir().unwrap();
    let text = stdout_of(
        scgrader(dir.path())
            .args(["submit", "does-not-exist", "abc123"])
            .assert()
            .failure(),
    );
    assert!(text.contains("Creating student abc123"));
    assert!(text.contains("FATAL ERROR: Folder 'does-not-exist' does not exist. Exiting."));
}

#[test]
fn should_reject_single_with_theme() {
    let dir = tempfile::tempdir().unwrap();
    scgrader(dir.path())
        .args(["define", "--single", "--theme", "2"])
        .assert()
        .failure();
}
