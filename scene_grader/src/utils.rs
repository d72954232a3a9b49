#[cfg(test)]
use std::path::{Path, PathBuf};

/// Writes an executable `/bin/sh` script named `name` into `dir`.
#[cfg(test)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::fs;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(perms.mode() | 0o755);
        fs::set_permissions(&path, perms).unwrap();
    }
    path
}
