use anyhow::Result;
use scrollstage_core::AppConfig;

pub fn run(config: &AppConfig, path_only: bool, save: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if save {
        config.save()?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
