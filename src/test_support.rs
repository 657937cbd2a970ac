//! Helpers for tests that drive external binaries

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::aws::AwsCli;

/// Write an executable `aws` stand-in into `dir` running `body` under /bin/sh.
/// Its arguments are recorded one per line in `dir/argv`.
pub fn fake_aws(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("aws");
    let argv = dir.join("argv");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
        argv.display(),
        body
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Arguments the fake `aws` in `dir` was last called with
pub fn recorded_argv(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("argv"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

pub fn fake_aws_cli(dir: &Path, body: &str) -> AwsCli {
    AwsCli::new(fake_aws(dir, body), None, Some("us-west-2".to_string()), false)
}
