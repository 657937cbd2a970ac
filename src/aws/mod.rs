pub mod cli;
pub mod client;
pub mod instances;

pub use cli::{AwsCli, EiceOptions};
pub use client::AwsClients;
pub use instances::{instance_choices, instances_by_id, InstanceDescriptor};
