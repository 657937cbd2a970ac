use aws_sdk_ec2::types::{Filter, Instance, InstanceStateName};
use aws_sdk_ec2::Client as Ec2Client;

use crate::picker::Choice;
use crate::{Ec2ConnectError, Result};

use super::client::AWS_NAME_TAG;

/// Reason shown next to instances that cannot act as a public jump host
pub const NO_PUBLIC_DNS: &str = "No public DNS";

const MAX_RESULTS: i32 = 1000;

/// A running instance as needed to connect to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub instance_id: String,
    pub public_dns: Option<String>,
    pub private_dns: String,
    pub name: Option<String>,
}

impl InstanceDescriptor {
    pub fn from_instance(instance: &Instance) -> Option<Self> {
        let instance_id = instance.instance_id()?.to_string();

        let public_dns = instance
            .public_dns_name()
            .filter(|dns| !dns.is_empty())
            .map(String::from);

        // Only an unambiguous Name tag is used as a label
        let mut names = instance
            .tags()
            .iter()
            .filter(|tag| tag.key() == Some(AWS_NAME_TAG))
            .filter_map(|tag| tag.value());
        let name = match (names.next(), names.next()) {
            (Some(name), None) => Some(name.to_string()),
            _ => None,
        };

        Some(Self {
            instance_id,
            public_dns,
            private_dns: instance.private_dns_name().unwrap_or_default().to_string(),
            name,
        })
    }

    /// Host to log in to: public DNS when present, otherwise private DNS
    pub fn hostname(&self) -> &str {
        self.public_dns.as_deref().unwrap_or(&self.private_dns)
    }

    pub fn title(&self) -> String {
        match self.name {
            Some(ref name) => format!("{} ({})", self.instance_id, name),
            None => self.instance_id.clone(),
        }
    }

    /// Wrap into a picker choice. With `public_only`, instances without a
    /// public DNS name are disabled.
    pub fn into_choice(self, public_only: bool) -> Choice<InstanceDescriptor> {
        let disabled = if public_only && self.public_dns.is_none() {
            Some(NO_PUBLIC_DNS.to_string())
        } else {
            None
        };

        Choice {
            title: self.title(),
            value: self,
            disabled,
        }
    }
}

/// List every running instance
pub async fn running_instances(ec2: &Ec2Client) -> Result<Vec<InstanceDescriptor>> {
    tracing::debug!("describing running instances");

    let response = ec2
        .describe_instances()
        .filters(
            Filter::builder()
                .name("instance-state-name")
                .values("running")
                .build(),
        )
        .max_results(MAX_RESULTS)
        .send()
        .await
        .map_err(Ec2ConnectError::ec2)?;

    let instances: Vec<InstanceDescriptor> = response
        .reservations()
        .iter()
        .flat_map(|reservation| reservation.instances())
        .filter_map(InstanceDescriptor::from_instance)
        .collect();

    tracing::debug!(count = instances.len(), "found running instances");

    Ok(instances)
}

/// Running instances as picker choices
pub async fn instance_choices(
    ec2: &Ec2Client,
    public_only: bool,
) -> Result<Vec<Choice<InstanceDescriptor>>> {
    let instances = running_instances(ec2).await?;
    Ok(instances
        .into_iter()
        .map(|instance| instance.into_choice(public_only))
        .collect())
}

/// Look up specific instances by id, keeping the requested order
pub async fn instances_by_id(ec2: &Ec2Client, ids: &[String]) -> Result<Vec<InstanceDescriptor>> {
    tracing::debug!(?ids, "describing instances");

    let response = ec2
        .describe_instances()
        .set_instance_ids(Some(ids.to_vec()))
        .send()
        .await
        .map_err(Ec2ConnectError::ec2)?;

    let found: Vec<&Instance> = response
        .reservations()
        .iter()
        .flat_map(|reservation| reservation.instances())
        .collect();

    requested_running(ids, &found)
}

/// Pick the requested ids out of a describe response, in order. Each one
/// must be present and running.
fn requested_running(ids: &[String], found: &[&Instance]) -> Result<Vec<InstanceDescriptor>> {
    ids.iter()
        .map(|id| {
            let instance = found
                .iter()
                .find(|instance| instance.instance_id() == Some(id.as_str()))
                .ok_or_else(|| Ec2ConnectError::InstanceNotFound(id.clone()))?;

            let state = instance.state().and_then(|state| state.name());
            if state != Some(&InstanceStateName::Running) {
                return Err(Ec2ConnectError::InstanceNotRunning(
                    id.clone(),
                    state.map_or("unknown", |name| name.as_str()).to_string(),
                ));
            }

            InstanceDescriptor::from_instance(instance)
                .ok_or_else(|| Ec2ConnectError::InstanceNotFound(id.clone()))
        })
        .collect()
}
