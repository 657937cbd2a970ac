use std::path::Path;

use crate::aws::{AwsCli, EiceOptions, InstanceDescriptor};
use crate::ssh::{create_ssh_keypair, public_key_path, remove_public_key, ExampleCommands};
use crate::Result;

/// Seconds a key pushed through EC2 Instance Connect stays valid
pub const KEY_LIFETIME_SECS: u32 = 60;

/// Open an interactive session over the EICE tunnel
pub fn instance_connect(aws: &AwsCli, opts: &EiceOptions) -> Result<()> {
    aws.instance_connect(opts)
}

/// Generate a throwaway keypair, push its public half to every instance and
/// return example commands when a bastion/private pair was involved
pub fn instance_connect_key(
    aws: &AwsCli,
    instances: &[InstanceDescriptor],
    private_key_file: &Path,
    os_user: &str,
    debug: bool,
) -> Result<Option<ExampleCommands>> {
    create_ssh_keypair(private_key_file, debug)?;
    push_and_discard_public_key(aws, instances, private_key_file, os_user)?;

    Ok(example_commands(instances, private_key_file, os_user))
}

/// Push `<key>.pub` to every instance, then delete it whether or not the
/// push succeeded. A push failure wins over a cleanup failure.
fn push_and_discard_public_key(
    aws: &AwsCli,
    instances: &[InstanceDescriptor],
    private_key_file: &Path,
    os_user: &str,
) -> Result<()> {
    let pushed = push_public_key(aws, instances, private_key_file, os_user);

    // Drop the public key so ssh-agent doesn't pick it up
    let removed = remove_public_key(private_key_file);

    if let Err(ref push_err) = pushed {
        if let Err(ref remove_err) = removed {
            tracing::warn!(
                key = %public_key_path(private_key_file).display(),
                error = %remove_err,
                "could not remove public key after failed push"
            );
        }
        tracing::debug!(error = %push_err, "pushing public key failed");
    }

    pushed?;
    removed
}

/// Line telling the user how long the pushed key stays valid
fn login_notice(instance: &InstanceDescriptor, private_key_file: &Path) -> String {
    format!(
        "You have {} seconds to log in to {} with {}",
        KEY_LIFETIME_SECS,
        instance.hostname(),
        private_key_file.display()
    )
}

fn push_public_key(
    aws: &AwsCli,
    instances: &[InstanceDescriptor],
    private_key_file: &Path,
    os_user: &str,
) -> Result<()> {
    let public_key = public_key_path(private_key_file);

    for instance in instances {
        aws.send_ssh_public_key(&instance.instance_id, os_user, &public_key)?;
        println!("{}", login_notice(instance, private_key_file));
    }

    Ok(())
}

/// First public DNS name among public instances and first private DNS name
/// among instances without one
fn jump_hosts(instances: &[InstanceDescriptor]) -> (Option<&str>, Option<&str>) {
    let public_dns = instances.iter().find_map(|i| i.public_dns.as_deref());
    let private_dns = instances
        .iter()
        .find(|i| i.public_dns.is_none())
        .map(|i| i.private_dns.as_str());
    (public_dns, private_dns)
}

fn example_commands(
    instances: &[InstanceDescriptor],
    private_key_file: &Path,
    os_user: &str,
) -> Option<ExampleCommands> {
    match jump_hosts(instances) {
        (Some(public_dns), Some(private_dns)) => Some(ExampleCommands::new(
            os_user,
            private_key_file,
            public_dns,
            private_dns,
        )),
        _ => None,
    }
}
