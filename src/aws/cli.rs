use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::tools::find_aws_cli;
use crate::{Ec2ConnectError, Result};

/// Oldest aws cli release that ships `ec2-instance-connect ssh` with EICE support
pub const MIN_AWS_VERSION: &str = "2.12.0";

static AWS_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^aws-cli/(.*?) ").expect("valid regex")
});

/// Options for an EICE tunnelled SSH session
#[derive(Debug, Clone)]
pub struct EiceOptions {
    pub instance_id: String,
    pub os_user: String,
    pub ssh_port: u16,
    pub private_key_file: Option<PathBuf>,
}

/// The `aws` binary together with the profile/region every call is scoped to
#[derive(Debug, Clone)]
pub struct AwsCli {
    path: PathBuf,
    profile: Option<String>,
    region: Option<String>,
    debug: bool,
}

impl AwsCli {
    pub fn new(
        path: impl Into<PathBuf>,
        profile: Option<String>,
        region: Option<String>,
        debug: bool,
    ) -> Self {
        Self {
            path: path.into(),
            profile,
            region,
            debug,
        }
    }

    /// Find `aws` on PATH
    pub fn locate(profile: Option<String>, region: Option<String>, debug: bool) -> Result<Self> {
        Ok(Self::new(find_aws_cli()?, profile, region, debug))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `aws --version` and return the parsed version
    pub fn version(&self) -> Result<Version> {
        tracing::debug!(aws = %self.path.display(), "checking aws cli version");

        let output = Command::new(&self.path)
            .arg("--version")
            .output()
            .map_err(|e| Ec2ConnectError::command(format!("aws --version: {}", e)))?;

        if !output.status.success() {
            return Err(Ec2ConnectError::Command(format!(
                "aws --version exited with code: {:?}",
                output.status.code()
            )));
        }

        // aws cli v1 reports its version on stderr
        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            stdout.into_owned()
        };

        extract_aws_version(&text)
    }

    /// Fail unless the installed aws cli is at least [`MIN_AWS_VERSION`]
    pub fn validate(&self) -> Result<Version> {
        let version = self.version()?;
        ensure_supported(&version)?;
        Ok(version)
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref profile) = self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(ref region) = self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        args
    }

    /// Arguments for `aws ec2-instance-connect ssh` over the EICE transport
    pub fn eice_ssh_args(&self, opts: &EiceOptions) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(
            [
                "ec2-instance-connect",
                "ssh",
                "--instance-id",
                opts.instance_id.as_str(),
                "--connection-type",
                "eice",
                "--os-user",
                opts.os_user.as_str(),
                "--ssh-port",
            ]
            .map(String::from),
        );
        args.push(opts.ssh_port.to_string());

        if let Some(ref key) = opts.private_key_file {
            args.push("--private-key-file".to_string());
            args.push(key.display().to_string());
        }

        if self.debug {
            args.push("--debug".to_string());
        }

        args
    }

    /// Arguments for `aws ec2-instance-connect send-ssh-public-key`
    pub fn send_ssh_public_key_args(
        &self,
        instance_id: &str,
        os_user: &str,
        public_key_uri: &str,
    ) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(
            [
                "ec2-instance-connect",
                "send-ssh-public-key",
                "--instance-id",
                instance_id,
                "--instance-os-user",
                os_user,
                "--ssh-public-key",
                public_key_uri,
            ]
            .map(String::from),
        );

        if self.debug {
            args.push("--debug".to_string());
        }

        args
    }

    /// Hand the terminal over to `aws ec2-instance-connect ssh`.
    ///
    /// On Unix this replaces the current process and only returns on failure.
    pub fn instance_connect(&self, opts: &EiceOptions) -> Result<()> {
        let args = self.eice_ssh_args(opts);
        tracing::debug!(aws = %self.path.display(), ?args, "starting EICE session");

        let mut command = Command::new(&self.path);
        command.args(&args);
        exec(command)
    }

    /// Push a public key to the instance metadata service, valid for 60 seconds
    pub fn send_ssh_public_key(
        &self,
        instance_id: &str,
        os_user: &str,
        public_key_file: &Path,
    ) -> Result<()> {
        let public_key_uri = file_uri(public_key_file)?;
        let args = self.send_ssh_public_key_args(instance_id, os_user, &public_key_uri);
        tracing::debug!(aws = %self.path.display(), ?args, "sending ssh public key");

        let output = Command::new(&self.path)
            .args(&args)
            .output()
            .map_err(|e| Ec2ConnectError::command(e.to_string()))?;

        if !output.status.success() {
            return Err(Ec2ConnectError::Command(format!(
                "send-ssh-public-key to {} exited with code {:?}: {}",
                instance_id,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

/// Pull the version out of `aws --version` output, e.g.
/// `aws-cli/2.13.5 Python/3.11.4 Linux/6.2.0 exe/x86_64.ubuntu.22`
pub fn extract_aws_version(version_string: &str) -> Result<Version> {
    let raw = AWS_VERSION_RE
        .captures(version_string.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Ec2ConnectError::AwsCliVersion(version_string.trim().to_string()))?;

    Version::parse(raw).map_err(|_| Ec2ConnectError::AwsCliVersion(raw.to_string()))
}

/// Compare a parsed version against [`MIN_AWS_VERSION`]
pub fn ensure_supported(version: &Version) -> Result<()> {
    let minimum = Version::parse(MIN_AWS_VERSION)
        .map_err(|e| Ec2ConnectError::AwsCliVersion(e.to_string()))?;

    if *version < minimum {
        return Err(Ec2ConnectError::UnsupportedAwsCli(version.to_string()));
    }

    Ok(())
}

#[cfg(unix)]
fn exec(mut command: Command) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let err = command.exec();
    Err(Ec2ConnectError::command(format!(
        "failed to start {}: {}",
        command.get_program().to_string_lossy(),
        err
    )))
}

#[cfg(not(unix))]
fn exec(mut command: Command) -> Result<()> {
    let status = command
        .status()
        .map_err(|e| Ec2ConnectError::command(e.to_string()))?;
    std::process::exit(status.code().unwrap_or(1));
}

fn file_uri(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)?;
    Ok(format!("file://{}", absolute.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(debug: bool) -> AwsCli {
        AwsCli::new(
            "/usr/local/bin/aws",
            Some("dev".to_string()),
            Some("us-west-2".to_string()),
            debug,
        )
    }

    #[test]
    fn test_extract_aws_version() {
        let v = extract_aws_version(
            "aws-cli/2.13.5 Python/3.11.4 Linux/6.2.0-1009-aws exe/x86_64.ubuntu.22 prompt/off\n",
        )
        .unwrap();
        assert_eq!(v, Version::new(2, 13, 5));

        let v = extract_aws_version("aws-cli/1.29.3 Python/3.9.16 Darwin/22.5.0 botocore/1.31.3")
            .unwrap();
        assert_eq!(v, Version::new(1, 29, 3));
    }

    #[test]
    fn test_extract_aws_version_invalid() {
        assert!(extract_aws_version("").is_err());
        assert!(extract_aws_version("command not found").is_err());
        assert!(extract_aws_version("aws-cli/2.13.5").is_err()); // no trailing space
        assert!(extract_aws_version("aws-cli/banana Python/3").is_err());
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported(&Version::new(2, 12, 0)).is_ok());
        assert!(ensure_supported(&Version::new(2, 15, 1)).is_ok());
        assert!(ensure_supported(&Version::new(3, 0, 0)).is_ok());

        let err = ensure_supported(&Version::new(2, 11, 9)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "aws cli version must be at least version 2.12.0, please upgrade."
        );
        assert!(ensure_supported(&Version::new(1, 29, 3)).is_err());
    }

    #[test]
    fn test_eice_ssh_args() {
        let opts = EiceOptions {
            instance_id: "i-0abc".to_string(),
            os_user: "ec2-user".to_string(),
            ssh_port: 22,
            private_key_file: None,
        };

        assert_eq!(
            cli(false).eice_ssh_args(&opts),
            vec![
                "--profile",
                "dev",
                "--region",
                "us-west-2",
                "ec2-instance-connect",
                "ssh",
                "--instance-id",
                "i-0abc",
                "--connection-type",
                "eice",
                "--os-user",
                "ec2-user",
                "--ssh-port",
                "22",
            ]
        );
    }

    #[test]
    fn test_eice_ssh_args_with_key_and_debug() {
        let opts = EiceOptions {
            instance_id: "i-0abc".to_string(),
            os_user: "ubuntu".to_string(),
            ssh_port: 2222,
            private_key_file: Some(PathBuf::from("/tmp/key")),
        };

        let args = cli(true).eice_ssh_args(&opts);
        assert!(args.ends_with(&[
            "2222".to_string(),
            "--private-key-file".to_string(),
            "/tmp/key".to_string(),
            "--debug".to_string(),
        ]));
    }

    #[test]
    fn test_base_args_omitted_without_profile_or_region() {
        let cli = AwsCli::new("aws", None, None, false);
        let args = cli.send_ssh_public_key_args("i-1", "ec2-user", "file:///tmp/k.pub");
        assert_eq!(args[0], "ec2-instance-connect");
        assert_eq!(args[1], "send-ssh-public-key");
        assert_eq!(args.last().unwrap(), "file:///tmp/k.pub");
    }

    #[cfg(unix)]
    #[test]
    fn test_version_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let aws = crate::test_support::fake_aws_cli(
            dir.path(),
            "echo 'aws-cli/1.29.3 Python/3.9.16 Darwin/22.5.0 botocore/1.31.3' >&2",
        );

        assert_eq!(aws.version().unwrap(), Version::new(1, 29, 3));
        assert!(matches!(
            aws.validate(),
            Err(Ec2ConnectError::UnsupportedAwsCli(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_version_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let aws = crate::test_support::fake_aws_cli(
            dir.path(),
            "echo 'aws-cli/2.15.30 Python/3.11.8 Linux/6.5.0 exe/x86_64.ubuntu.22 prompt/off'",
        );

        assert_eq!(aws.validate().unwrap(), Version::new(2, 15, 30));
        assert_eq!(crate::test_support::recorded_argv(dir.path()), vec!["--version"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_send_ssh_public_key_uses_absolute_file_uri() {
        let dir = tempfile::tempdir().unwrap();
        let aws = crate::test_support::fake_aws_cli(dir.path(), "exit 0");
        let public_key = dir.path().join("ec2connect.pub");
        std::fs::write(&public_key, "ssh-ed25519 AAAA ec2connect@auto\n").unwrap();

        aws.send_ssh_public_key("i-0abc", "ec2-user", &public_key)
            .unwrap();

        let absolute = std::fs::canonicalize(&public_key).unwrap();
        let argv = crate::test_support::recorded_argv(dir.path());
        assert_eq!(
            argv,
            vec![
                "--region".to_string(),
                "us-west-2".to_string(),
                "ec2-instance-connect".to_string(),
                "send-ssh-public-key".to_string(),
                "--instance-id".to_string(),
                "i-0abc".to_string(),
                "--instance-os-user".to_string(),
                "ec2-user".to_string(),
                "--ssh-public-key".to_string(),
                format!("file://{}", absolute.display()),
            ]
        );
        assert!(argv.last().unwrap().starts_with("file:///"));
    }

    #[cfg(unix)]
    #[test]
    fn test_send_ssh_public_key_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let aws = crate::test_support::fake_aws_cli(
            dir.path(),
            "echo 'An error occurred (EC2InstanceStateInvalidException)' >&2\nexit 254",
        );
        let public_key = dir.path().join("ec2connect.pub");
        std::fs::write(&public_key, "ssh-ed25519 AAAA").unwrap();

        let err = aws
            .send_ssh_public_key("i-0abc", "ec2-user", &public_key)
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("send-ssh-public-key to i-0abc"));
        assert!(message.contains("Some(254)"));
        assert!(message.contains("EC2InstanceStateInvalidException"));
    }

    #[test]
    fn test_send_ssh_public_key_args() {
        let args = cli(true).send_ssh_public_key_args("i-1", "admin", "file:///tmp/k.pub");
        assert_eq!(
            args,
            vec![
                "--profile",
                "dev",
                "--region",
                "us-west-2",
                "ec2-instance-connect",
                "send-ssh-public-key",
                "--instance-id",
                "i-1",
                "--instance-os-user",
                "admin",
                "--ssh-public-key",
                "file:///tmp/k.pub",
                "--debug",
            ]
        );
    }
}
