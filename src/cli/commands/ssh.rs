use std::path::PathBuf;

use super::Context;
use crate::aws::EiceOptions;
use crate::connect::instance_connect;
use crate::picker;
use crate::Result;

pub async fn execute(
    ctx: &Context,
    instance_id: Option<String>,
    os_user: Option<String>,
    ssh_port: Option<u16>,
    private_key_file: Option<PathBuf>,
) -> Result<()> {
    let aws = ctx.aws_cli()?;
    let os_user = ctx.settings.resolve_os_user(os_user)?;
    let ssh_port = ctx.settings.resolve_ssh_port(ssh_port);

    let instance_id = match instance_id {
        Some(id) => id,
        None => {
            let choices = ctx.instance_choices(false).await?;
            picker::select("Select an instance", &choices)?.instance_id
        }
    };

    println!("Connecting to {} as {} over EICE...", instance_id, os_user);

    instance_connect(
        &aws,
        &EiceOptions {
            instance_id,
            os_user,
            ssh_port,
            private_key_file,
        },
    )
}
