mod examples;
mod keypair;

pub use examples::ExampleCommands;
pub use keypair::{create_ssh_keypair, public_key_path, remove_public_key};
