use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::tools::find_ssh_keygen;
use crate::{Ec2ConnectError, Result};

const KEY_COMMENT: &str = "ec2connect@auto";

/// Path ssh-keygen writes the public half to
pub fn public_key_path(private_key_file: &Path) -> PathBuf {
    let mut path = OsString::from(private_key_file.as_os_str());
    path.push(".pub");
    PathBuf::from(path)
}

/// Generate a fresh ed25519 keypair at `private_key_file`, replacing any
/// existing key there
pub fn create_ssh_keypair(private_key_file: &Path, debug: bool) -> Result<()> {
    let ssh_keygen = find_ssh_keygen()?;
    create_ssh_keypair_with(&ssh_keygen, private_key_file, debug)
}

pub(crate) fn create_ssh_keypair_with(
    ssh_keygen: &Path,
    private_key_file: &Path,
    debug: bool,
) -> Result<()> {
    // ssh-keygen asks before overwriting, which would fail without a tty
    remove_if_exists(private_key_file)?;

    if let Some(parent) = private_key_file.parent() {
        create_key_dir(parent)?;
    }

    let mut command = Command::new(ssh_keygen);
    command
        .args(["-t", "ed25519", "-N", "", "-C", KEY_COMMENT, "-f"])
        .arg(private_key_file);

    if debug {
        command.arg("-v");
    }

    tracing::debug!(key = %private_key_file.display(), "generating ssh keypair");

    let output = command
        .output()
        .map_err(|e| Ec2ConnectError::KeyGeneration(e.to_string()))?;

    if !output.status.success() {
        let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if message.is_empty() {
            message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        return Err(Ec2ConnectError::KeyGeneration(message));
    }

    Ok(())
}

/// Create the directory holding keys, owner-only on Unix like `~/.ssh`
fn create_key_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir)?;
    Ok(())
}

/// Delete the public half so it doesn't linger next to the private key
pub fn remove_public_key(private_key_file: &Path) -> Result<()> {
    remove_if_exists(&public_key_path(private_key_file))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_path() {
        assert_eq!(
            public_key_path(Path::new("/home/me/.ssh/ec2connect")),
            PathBuf::from("/home/me/.ssh/ec2connect.pub")
        );
        // Appends rather than replacing an extension, like ssh-keygen
        assert_eq!(
            public_key_path(Path::new("keys/bastion.key")),
            PathBuf::from("keys/bastion.key.pub")
        );
    }

    #[test]
    fn test_remove_public_key_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("id");
        assert!(remove_public_key(&key).is_ok());
    }

    #[test]
    fn test_remove_public_key_keeps_private() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("id");
        std::fs::write(&key, "private").unwrap();
        std::fs::write(public_key_path(&key), "public").unwrap();

        remove_public_key(&key).unwrap();

        assert!(key.exists());
        assert!(!public_key_path(&key).exists());
    }

    #[test]
    fn test_create_keypair_replaces_existing() {
        let Ok(ssh_keygen) = which::which("ssh-keygen") else {
            eprintln!("skipping test_create_keypair_replaces_existing: ssh-keygen not on PATH");
            return;
        };

        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("ec2connect");

        create_ssh_keypair_with(&ssh_keygen, &key, false).unwrap();
        let first = std::fs::read_to_string(&key).unwrap();
        assert!(public_key_path(&key).exists());

        create_ssh_keypair_with(&ssh_keygen, &key, false).unwrap();
        let second = std::fs::read_to_string(&key).unwrap();

        assert_ne!(first, second);
        let public = std::fs::read_to_string(public_key_path(&key)).unwrap();
        assert!(public.starts_with("ssh-ed25519 "));
        assert!(public.trim_end().ends_with(KEY_COMMENT));
    }

    #[cfg(unix)]
    #[test]
    fn test_key_dir_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ssh_dir = dir.path().join("home").join(".ssh");

        create_key_dir(&ssh_dir).unwrap();

        let mode = std::fs::metadata(&ssh_dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        // existing directories are left alone
        assert!(create_key_dir(&ssh_dir).is_ok());
        assert!(create_key_dir(Path::new("")).is_ok());
    }

    #[test]
    fn test_create_keypair_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-ssh-keygen");
        let key = dir.path().join("id");

        let err = create_ssh_keypair_with(&missing, &key, false).unwrap_err();
        assert!(err.to_string().starts_with("Error generating SSH key: "));
    }
}
