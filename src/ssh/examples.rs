use std::borrow::Cow;
use std::path::Path;

use shell_escape::escape;

/// Sample commands for reaching a private instance through a public bastion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleCommands {
    pub proxy: String,
    pub ssh: String,
    pub scp: String,
}

impl ExampleCommands {
    pub fn new(os_user: &str, private_key_file: &Path, public_dns: &str, private_dns: &str) -> Self {
        let key = private_key_file.to_string_lossy();
        let key = escape(Cow::Borrowed(key.as_ref())).into_owned();

        let proxy = format!("ssh -i {key} -W '[%h]:%p' {os_user}@{public_dns}");
        let ssh = format!("ssh -o ProxyCommand=\"{proxy}\" -i {key} {os_user}@{private_dns}");
        let scp = format!(
            "scp -o ProxyCommand=\"{proxy}\" -i {key} <file> {os_user}@{private_dns}:<file>"
        );

        Self { proxy, ssh, scp }
    }

    pub fn print(&self) {
        println!("Example SSH command:\n{}", self.ssh);
        println!("Example SCP command:\n{}", self.scp);
    }
}
