//! Preference command handlers

use anyhow::{anyhow, bail, Context, Result};

use lane_core::{CaptureMode, MemoryLane, Theme};

use crate::output::Output;

const VALID_KEYS: &str = "theme, font_size, animations_enabled, reduced_motion, \
    default_capture_mode, location_tracking_enabled, voice_input_enabled, auto_save";

/// Show the current preferences
pub fn show(lane: &MemoryLane, output: &Output) -> Result<()> {
    output.print_preferences(lane.preferences());
    Ok(())
}

/// Set one preference
pub fn set(lane: &mut MemoryLane, key: String, value: String, output: &Output) -> Result<()> {
    // Accept the stored camelCase names too
    let normalized = key.replace('-', "_").to_ascii_lowercase();

    let changed = match normalized.as_str() {
        "theme" => {
            let theme: Theme = value.parse().map_err(|e: String| anyhow!(e))?;
            lane.set_theme(theme)
        }
        "font_size" | "fontsize" => {
            let size: u32 = value
                .parse()
                .context("Invalid value for font_size. Use a whole number.")?;
            if size == 0 {
                bail!("font_size must be greater than zero");
            }
            lane.set_font_size(size)
        }
        "animations_enabled" | "animationsenabled" => {
            lane.set_animations_enabled(parse_bool(&key, &value)?)
        }
        "reduced_motion" | "reducedmotion" => lane.set_reduced_motion(parse_bool(&key, &value)?),
        "default_capture_mode" | "defaultcapturemode" => {
            let mode: CaptureMode = value.parse().map_err(|e: String| anyhow!(e))?;
            lane.set_default_capture_mode(mode)
        }
        "location_tracking_enabled" | "locationtrackingenabled" => {
            lane.set_location_tracking_enabled(parse_bool(&key, &value)?)
        }
        "voice_input_enabled" | "voiceinputenabled" => {
            lane.set_voice_input_enabled(parse_bool(&key, &value)?)
        }
        "auto_save" | "autosave" => lane.set_auto_save(parse_bool(&key, &value)?),
        _ => bail!(
            "Unknown preference: '{}'\nValid keys: {}",
            key,
            VALID_KEYS
        ),
    };

    if changed {
        output.success(&format!("Set {} = {}", key, value));
    } else {
        output.message(&format!("{} is already {}", key, value));
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("Invalid value for {}. Use 'true' or 'false'.", key),
    }
}
