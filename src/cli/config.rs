use crate::config::{load_config, validate_config, Config};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration with a home-relative save directory, as YAML.
pub fn sample_config() -> Result<String, serde_yaml::Error> {
    let mut config = Config::default();
    config.storage.save_dir = PathBuf::from("~/datalogs");
    serde_yaml::to_string(&config)
}

/// Print the sample config, or write it to `~/.config/datalogger/config.yml`.
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = sample_config()?;

    if stdout {
        print!("{}", content);
        return Ok(());
    }

    let home = dirs::home_dir().ok_or("could not determine home directory; use --stdout")?;
    let config_path = home.join(".config/datalogger/config.yml");
    write_new_file(&config_path, &content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

fn write_new_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!(
            "config file already exists at {}; remove it first or use --stdout",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Load and validate a config file, reporting the result on stdout.
pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("no config file found; use --config to specify a path")?;

    println!("Validating config file: {}", path.display());

    let config = load_config(&path)?;
    validate_config(&config)?;

    println!("Config is valid");
    Ok(())
}
