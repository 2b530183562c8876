//! Init command handler: write a default config file.

use crate::config::Config;

pub async fn cmd_init() -> anyhow::Result<()> {
    let path = Config::default_config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save_to_path(&path)?;
    println!("Wrote default config to {}", path.display());
    println!("Set TUBEVAULT_API_KEY in the environment (or a .env file) before fetching.");

    Ok(())
}
