use crate::config::{Settings, DEFAULT_OS_USER, DEFAULT_SSH_PORT, SETTING_KEYS};
use crate::Result;

pub fn show() -> Result<()> {
    println!("Configuration:");
    println!();

    println!("Config file:");
    match Settings::config_path() {
        Some(path) => println!("  {}", path.display()),
        None => println!("  (unavailable)"),
    }

    println!();
    println!("Settings:");
    let settings = Settings::load()?;
    let entries = settings.entries();
    if entries.is_empty() {
        println!("  (none configured)");
    } else {
        for (key, value) in entries {
            println!("  {}={}", key, value);
        }
    }

    println!();
    println!("Defaults:");
    println!("  os-user={}", DEFAULT_OS_USER);
    println!("  ssh-port={}", DEFAULT_SSH_PORT);
    match settings.resolve_private_key_file(None) {
        Ok(path) => println!("  private-key-file={}", path.display()),
        Err(e) => println!("  private-key-file: {}", e),
    }

    Ok(())
}

/// Set a setting
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load()?;
    settings.set(key, value)?;
    settings.save()?;
    println!("'{}' set to '{}'", key, value);
    Ok(())
}

/// Clear a setting
pub fn unset(key: &str) -> Result<()> {
    let mut settings = Settings::load()?;

    if settings.unset(key)? {
        settings.save()?;
        println!("'{}' cleared", key);
    } else {
        println!("'{}' is not set", key);
        println!();
        println!("Valid settings: {}", SETTING_KEYS.join(", "));
    }

    Ok(())
}
