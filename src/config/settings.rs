use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::{Ec2ConnectError, Result};

pub const DEFAULT_OS_USER: &str = "ec2-user";
pub const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_KEY_NAME: &str = "ec2connect";

/// Keys accepted by `config set` / `config unset`
pub const SETTING_KEYS: &[&str] = &["profile", "region", "os-user", "ssh-port", "private-key-file"];

/// User defaults for ec2connect
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// AWS profile to use when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// AWS region to use when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,

    /// Where throwaway keys are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_file: Option<PathBuf>,
}

impl Settings {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ec2connect").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from the config file
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            Ec2ConnectError::Config("Cannot determine config directory".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            Ec2ConnectError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save settings to the config file with restricted permissions (0600)
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            Ec2ConnectError::Config("Cannot determine config directory".to_string())
        })?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)?;
            file.write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&path, content)?;
        }

        Ok(())
    }

    /// Validate a login user name
    pub fn validate_os_user(user: &str) -> Result<()> {
        if user.is_empty() {
            return Err(Ec2ConnectError::Config("OS user cannot be empty".to_string()));
        }
        if user.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Ec2ConnectError::Config(
                "OS user cannot contain whitespace".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate an SSH port
    pub fn parse_ssh_port(value: &str) -> Result<u16> {
        match value.trim().parse::<u16>() {
            Ok(0) | Err(_) => Err(Ec2ConnectError::Config(format!(
                "Invalid SSH port '{}': expected a number between 1 and 65535",
                value
            ))),
            Ok(port) => Ok(port),
        }
    }

    /// Set a setting by its CLI key (validates the value)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "profile" => self.profile = Some(non_empty(key, value)?),
            "region" => self.region = Some(non_empty(key, value)?),
            "os-user" => {
                Self::validate_os_user(value)?;
                self.os_user = Some(value.to_string());
            }
            "ssh-port" => self.ssh_port = Some(Self::parse_ssh_port(value)?),
            "private-key-file" => {
                self.private_key_file = Some(PathBuf::from(non_empty(key, value)?))
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Clear a setting, returning whether it was set
    pub fn unset(&mut self, key: &str) -> Result<bool> {
        let was_set = match key {
            "profile" => self.profile.take().is_some(),
            "region" => self.region.take().is_some(),
            "os-user" => self.os_user.take().is_some(),
            "ssh-port" => self.ssh_port.take().is_some(),
            "private-key-file" => self.private_key_file.take().is_some(),
            _ => return Err(unknown_key(key)),
        };
        Ok(was_set)
    }

    /// `(key, value)` pairs for display, unset values omitted
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(ref v) = self.profile {
            entries.push(("profile", v.clone()));
        }
        if let Some(ref v) = self.region {
            entries.push(("region", v.clone()));
        }
        if let Some(ref v) = self.os_user {
            entries.push(("os-user", v.clone()));
        }
        if let Some(v) = self.ssh_port {
            entries.push(("ssh-port", v.to_string()));
        }
        if let Some(ref v) = self.private_key_file {
            entries.push(("private-key-file", v.display().to_string()));
        }
        entries
    }

    /// CLI value first, then settings, then `ec2-user`
    pub fn resolve_os_user(&self, cli: Option<String>) -> Result<String> {
        let user = cli
            .or_else(|| self.os_user.clone())
            .unwrap_or_else(|| DEFAULT_OS_USER.to_string());
        Self::validate_os_user(&user)?;
        Ok(user)
    }

    pub fn resolve_ssh_port(&self, cli: Option<u16>) -> u16 {
        cli.or(self.ssh_port).unwrap_or(DEFAULT_SSH_PORT)
    }

    /// CLI value first, then settings, then `~/.ssh/ec2connect`
    pub fn resolve_private_key_file(&self, cli: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = cli.or_else(|| self.private_key_file.clone()) {
            return Ok(expand_home(path));
        }

        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".ssh").join(DEFAULT_KEY_NAME))
            .ok_or_else(|| Ec2ConnectError::Config("Cannot determine home directory".to_string()))
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Ec2ConnectError::Config(format!("{} cannot be empty", key)));
    }
    Ok(value.to_string())
}

fn unknown_key(key: &str) -> Ec2ConnectError {
    Ec2ConnectError::Config(format!(
        "Unknown setting '{}'. Valid settings: {}",
        key,
        SETTING_KEYS.join(", ")
    ))
}

/// Expand a leading `~/` the way a shell would
fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => path,
        },
        Err(_) => path,
    }
}
