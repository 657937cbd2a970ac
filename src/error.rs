use thiserror::Error;

use crate::aws::cli::MIN_AWS_VERSION;

#[derive(Error, Debug)]
pub enum Ec2ConnectError {
    // External tools
    #[error("aws cli could not be found on PATH")]
    AwsCliNotFound,

    #[error("ssh-keygen could not be found on PATH, is openssh-client installed?")]
    SshKeygenNotFound,

    #[error("aws cli version must be at least version {}, please upgrade.", MIN_AWS_VERSION)]
    UnsupportedAwsCli(String),

    #[error("Could not determine aws cli version from: {0}")]
    AwsCliVersion(String),

    #[error("Error generating SSH key: {0}")]
    KeyGeneration(String),

    #[error("Command failed: {0}")]
    Command(String),

    // AWS
    #[error("AWS EC2 error: {0}")]
    Ec2(String),

    #[error("No AWS region configured. Pass --region, set AWS_REGION or run 'ec2connect config set region <REGION>'")]
    NoRegion,

    // Instances
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Instance {0} is not running (state: {1})")]
    InstanceNotRunning(String, String),

    #[error("no running instances found")]
    NoInstances,

    #[error("none of the running instances can be selected")]
    NothingSelectable,

    // Config
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prerequisites not met: {0}")]
    Prerequisites(String),

    // File/IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // User cancelled
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl Ec2ConnectError {
    pub fn ec2(err: impl std::fmt::Display) -> Self {
        Ec2ConnectError::Ec2(err.to_string())
    }

    pub fn command(err: impl std::fmt::Display) -> Self {
        Ec2ConnectError::Command(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Ec2ConnectError>;
