use std::path::PathBuf;

use crate::{Ec2ConnectError, Result};

/// Locate the `aws` binary on PATH
pub fn find_aws_cli() -> Result<PathBuf> {
    which::which("aws").map_err(|_| Ec2ConnectError::AwsCliNotFound)
}

/// Locate the `ssh-keygen` binary on PATH
pub fn find_ssh_keygen() -> Result<PathBuf> {
    which::which("ssh-keygen").map_err(|_| Ec2ConnectError::SshKeygenNotFound)
}
