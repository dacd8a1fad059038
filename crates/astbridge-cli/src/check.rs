//! Configuration loading and validation

use anyhow::{Context, Result};
use astbridge_core::BootstrapConfig;

/// Load the configuration at `path`, or the built-in defaults.
pub fn load_config(path: Option<&str>) -> Result<BootstrapConfig> {
    let config = match path {
        Some(path) => BootstrapConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {path}"))?,
        None => BootstrapConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// One line per family: name, root, units and whether it dispatches.
pub fn family_summary(config: &BootstrapConfig) -> Vec<String> {
    config
        .families
        .iter()
        .map(|family| {
            let dispatch = if config.is_dispatch(family) {
                " (dispatch)"
            } else {
                ""
            };
            format!(
                "{}: root {}, units [{}], walker {}{dispatch}",
                family.name,
                family.root,
                family.units.join(", "),
                family.walker
            )
        })
        .collect()
}

/// Check command implementation
pub fn check(config_path: Option<String>) -> Result<()> {
    match &config_path {
        Some(path) => println!("Checking configuration: {path}"),
        None => println!("Checking built-in configuration"),
    }

    let config = load_config(config_path.as_deref())?;

    println!("✓ Families: {}", config.families.len());
    for line in family_summary(&config) {
        println!("  - {line}");
    }
    println!(
        "✓ Discriminant: {}",
        config
            .normalize
            .discriminant
            .as_ref()
            .map(|d| format!("{}::{}", d.owner, d.enum_name))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("\nConfiguration is valid!");

    Ok(())
}
