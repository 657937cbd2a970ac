pub mod config;
pub mod doctor;
pub mod key;
pub mod list;
pub mod ssh;

use indicatif::{ProgressBar, ProgressStyle};

use crate::aws::instances::running_instances;
use crate::aws::{instance_choices, AwsCli, AwsClients, InstanceDescriptor};
use crate::config::Settings;
use crate::picker::Choice;
use crate::Result;

/// Global options merged with the settings file
pub struct Context {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub debug: bool,
    pub settings: Settings,
}

impl Context {
    pub fn new(profile: Option<String>, region: Option<String>, debug: bool) -> Result<Self> {
        let settings = Settings::load()?;
        Ok(Self {
            profile: profile.or_else(|| settings.profile.clone()),
            region: region.or_else(|| settings.region.clone()),
            debug,
            settings,
        })
    }

    /// Locate the aws cli and check its version
    pub fn aws_cli(&self) -> Result<AwsCli> {
        let aws = AwsCli::locate(self.profile.clone(), self.region.clone(), self.debug)?;
        let version = aws.validate()?;
        tracing::debug!(%version, aws = %aws.path().display(), "aws cli version ok");
        Ok(aws)
    }

    pub async fn clients(&self) -> Result<AwsClients> {
        AwsClients::new(self.profile.as_deref(), self.region.as_deref()).await
    }

    /// Fetch running instances behind a spinner
    pub async fn running_instances(&self) -> Result<Vec<InstanceDescriptor>> {
        let spinner = create_spinner("Looking up running instances...");
        let result: Result<Vec<InstanceDescriptor>> = async {
            let clients = self.clients().await?;
            running_instances(&clients.ec2).await
        }
        .await;
        spinner.finish_and_clear();
        result
    }

    /// Fetch running instances as picker choices behind a spinner
    pub async fn instance_choices(
        &self,
        public_only: bool,
    ) -> Result<Vec<Choice<InstanceDescriptor>>> {
        let spinner = create_spinner("Looking up running instances...");
        let result: Result<Vec<Choice<InstanceDescriptor>>> = async {
            let clients = self.clients().await?;
            instance_choices(&clients.ec2, public_only).await
        }
        .await;
        spinner.finish_and_clear();
        result
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
