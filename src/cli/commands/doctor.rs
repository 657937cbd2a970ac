use super::Context;
use crate::aws::AwsCli;
use crate::tools::find_ssh_keygen;
use crate::{Ec2ConnectError, Result};

pub async fn execute(ctx: &Context) -> Result<()> {
    println!("Checking prerequisites...\n");

    let mut all_ok = true;

    // Check AWS CLI
    print!("  AWS CLI: ");
    match AwsCli::locate(ctx.profile.clone(), ctx.region.clone(), ctx.debug) {
        Ok(aws) => match aws.validate() {
            Ok(version) => println!("OK ({}, {})", version, aws.path().display()),
            Err(e) => {
                println!("UNSUPPORTED");
                println!("    {}", e);
                all_ok = false;
            }
        },
        Err(e) => {
            println!("MISSING");
            println!("    {}", e);
            println!("    Install from: https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html");
            all_ok = false;
        }
    }

    // Check ssh-keygen
    print!("  ssh-keygen: ");
    match find_ssh_keygen() {
        Ok(path) => println!("OK ({})", path.display()),
        Err(e) => {
            println!("MISSING");
            println!("    {}", e);
            all_ok = false;
        }
    }

    // Check AWS configuration
    print!("  AWS configuration: ");
    match ctx.clients().await {
        Ok(clients) => {
            println!("OK");
            println!(
                "    Profile: {}",
                ctx.profile.as_deref().unwrap_or("(default)")
            );
            println!("    Region: {}", clients.region);
        }
        Err(e) => {
            println!("MISSING/INVALID");
            println!("    {}", e);
            println!("    Configure with: aws configure");
            all_ok = false;
        }
    }

    println!();

    if all_ok {
        println!("All prerequisites met! Connect with 'ec2connect ssh' or 'ec2connect key'.");
        Ok(())
    } else {
        Err(Ec2ConnectError::Prerequisites(
            "Some prerequisites are not met".to_string(),
        ))
    }
}
