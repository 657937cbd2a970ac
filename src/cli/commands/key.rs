use std::path::PathBuf;

use super::Context;
use crate::aws::{instances_by_id, InstanceDescriptor};
use crate::connect::instance_connect_key;
use crate::picker;
use crate::Result;

pub async fn execute(
    ctx: &Context,
    instance_ids: Vec<String>,
    os_user: Option<String>,
    private_key_file: Option<PathBuf>,
    bastion: bool,
) -> Result<()> {
    let aws = ctx.aws_cli()?;
    let os_user = ctx.settings.resolve_os_user(os_user)?;
    let private_key_file = ctx.settings.resolve_private_key_file(private_key_file)?;

    let instances = if !instance_ids.is_empty() {
        let clients = ctx.clients().await?;
        instances_by_id(&clients.ec2, &instance_ids).await?
    } else {
        pick_instances(ctx, bastion).await?
    };

    if let Some(examples) =
        instance_connect_key(&aws, &instances, &private_key_file, &os_user, ctx.debug)?
    {
        examples.print();
    }

    Ok(())
}

/// One instance, or a public bastion followed by the instance behind it
async fn pick_instances(ctx: &Context, bastion: bool) -> Result<Vec<InstanceDescriptor>> {
    if !bastion {
        let choices = ctx.instance_choices(false).await?;
        return Ok(vec![picker::select("Select an instance", &choices)?]);
    }

    let running = ctx.running_instances().await?;

    let bastion_choices: Vec<_> = running
        .iter()
        .cloned()
        .map(|instance| instance.into_choice(true))
        .collect();
    let jump_host = picker::select("Select a bastion host", &bastion_choices)?;

    let target_choices: Vec<_> = running
        .into_iter()
        .filter(|instance| instance.instance_id != jump_host.instance_id)
        .map(|instance| instance.into_choice(false))
        .collect();
    let target = picker::select("Select the target instance", &target_choices)?;

    Ok(vec![jump_host, target])
}
