use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aws;
mod cli;
mod config;
mod connect;
mod error;
mod picker;
mod ssh;
#[cfg(all(test, unix))]
mod test_support;
mod tools;

pub use error::{Ec2ConnectError, Result};

use cli::commands::{self, Context};

#[derive(Parser)]
#[command(name = "ec2connect")]
#[command(about = "Connect to EC2 instances with EC2 Instance Connect")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// AWS profile to use
    #[arg(short, long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region to use
    #[arg(short, long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// Verbose logging, also passed on to aws and ssh-keygen
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// SSH into an instance through an EC2 Instance Connect Endpoint
    Ssh {
        /// Instance to connect to (prompts if omitted)
        #[arg(short, long)]
        instance_id: Option<String>,

        /// OS user to log in as [default: ec2-user]
        #[arg(short = 'u', long)]
        os_user: Option<String>,

        /// SSH port on the instance [default: 22]
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        ssh_port: Option<u16>,

        /// Private key to authenticate with instead of a generated one
        #[arg(short = 'k', long)]
        private_key_file: Option<PathBuf>,
    },

    /// Push a throwaway SSH key to instances, valid for 60 seconds
    Key {
        /// Instances to push the key to (prompts if omitted)
        #[arg(short, long = "instance-id")]
        instance_ids: Vec<String>,

        /// OS user the key is authorized for [default: ec2-user]
        #[arg(short = 'u', long)]
        os_user: Option<String>,

        /// Where to write the generated private key [default: ~/.ssh/ec2connect]
        #[arg(short = 'k', long)]
        private_key_file: Option<PathBuf>,

        /// Pick a public bastion host and a private instance behind it
        #[arg(short, long, conflicts_with = "instance_ids")]
        bastion: bool,
    },

    /// List running instances
    List {
        /// Mark instances without a public DNS name
        #[arg(long)]
        public_only: bool,
    },

    /// Check prerequisites
    Doctor,

    /// Manage saved defaults
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Save a default (profile, region, os-user, ssh-port, private-key-file)
    Set {
        /// Setting name
        key: String,

        /// Setting value
        value: String,
    },

    /// Remove a saved default
    Unset {
        /// Setting name
        key: String,
    },
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "ec2connect=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        profile,
        region,
        debug,
        command,
    } = Cli::parse();

    init_logging(debug);

    let context = || Context::new(profile.clone(), region.clone(), debug);

    match command {
        Commands::Ssh {
            instance_id,
            os_user,
            ssh_port,
            private_key_file,
        } => {
            let ctx = context()?;
            commands::ssh::execute(&ctx, instance_id, os_user, ssh_port, private_key_file).await?
        }
        Commands::Key {
            instance_ids,
            os_user,
            private_key_file,
            bastion,
        } => {
            let ctx = context()?;
            commands::key::execute(&ctx, instance_ids, os_user, private_key_file, bastion).await?
        }
        Commands::List { public_only } => commands::list::execute(&context()?, public_only).await?,
        Commands::Doctor => commands::doctor::execute(&context()?).await?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show()?,
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value)?,
            ConfigCommands::Unset { key } => commands::config::unset(&key)?,
        },
    }

    Ok(())
}
