use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::Client as Ec2Client;

use crate::{Ec2ConnectError, Result};

/// Standard Name tag
pub const AWS_NAME_TAG: &str = "Name";

/// EC2 client scoped to the profile/region the aws cli calls will use
#[derive(Clone)]
pub struct AwsClients {
    pub ec2: Ec2Client,
    pub region: String,
}

impl AwsClients {
    /// Build clients from the default credential chain, overriding the
    /// profile and region when given
    pub async fn new(profile: Option<&str>, region: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.to_string())
            .ok_or(Ec2ConnectError::NoRegion)?;

        tracing::debug!(?profile, %region, "loaded aws config");

        Ok(Self {
            ec2: Ec2Client::new(&config),
            region,
        })
    }
}
