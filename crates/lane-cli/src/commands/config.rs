//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use lane_core::{Config, FixedLocation};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.to_string(),
                    "undo_window_secs": config.undo_window_secs,
                    "log_file": config.log_file,
                    "location": config.location,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  backend:          {}", config.backend);
            println!("  undo_window_secs: {}", config.undo_window_secs);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!(
                "  location:         {}",
                config
                    .location
                    .as_ref()
                    .map(format_location)
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "backend" => {
            config.backend = value.parse()?;
        }
        "undo_window_secs" => {
            config.undo_window_secs = value
                .parse()
                .context("Invalid value for undo_window_secs. Use a whole number of seconds.")?;
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        "location" => {
            config.location = if unset {
                None
            } else {
                Some(parse_location(value)?)
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, backend, undo_window_secs, log_file, location",
                key
            );
        }
    }

    Ok(())
}

/// Parse `lat,lon` or `lat,lon,address`
fn parse_location(value: &str) -> Result<FixedLocation> {
    let mut parts = value.splitn(3, ',').map(str::trim);
    let (Some(lat), Some(lon)) = (parts.next(), parts.next()) else {
        bail!("Invalid location. Use 'latitude,longitude[,address]'.");
    };

    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("Invalid latitude: '{}'", lat))?;
    let longitude: f64 = lon
        .parse()
        .with_context(|| format!("Invalid longitude: '{}'", lon))?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        bail!("Location out of range: {}, {}", latitude, longitude);
    }

    Ok(FixedLocation {
        latitude,
        longitude,
        address: parts.next().filter(|a| !a.is_empty()).map(String::from),
    })
}

fn format_location(location: &FixedLocation) -> String {
    match &location.address {
        Some(address) => format!(
            "{}, {} ({})",
            location.latitude, location.longitude, address
        ),
        None => format!("{}, {}", location.latitude, location.longitude),
    }
}
