mod settings;

pub use settings::{Settings, DEFAULT_OS_USER, DEFAULT_SSH_PORT, SETTING_KEYS};
