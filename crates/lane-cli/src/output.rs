//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Utc};
use serde::Serialize;

use lane_core::{Note, UserPreferences};

/// Content preview length in the timeline
const PREVIEW_CHARS: usize = 100;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A tag and how many notes carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single note in full
    pub fn print_note(&self, note: &Note) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", note.id);
                println!("Title:     {}", note.display_title());
                if let Some(address) = &note.location.address {
                    println!("Location:  {}", address);
                } else if !note.location.is_unknown() {
                    println!(
                        "Location:  {:.4}, {:.4}",
                        note.location.latitude, note.location.longitude
                    );
                }
                if !note.tags.is_empty() {
                    println!("Tags:      {}", format_tags(&note.tags));
                }
                println!("Favorite:  {}", if note.is_favorite { "yes" } else { "no" });
                println!("Captured:  {}", note.capture_mode);
                println!("Created:   {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:   {}", note.updated_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", note.content);
            }
            OutputFormat::Json => print_json(note),
            OutputFormat::Quiet => {
                println!("{}", note.id);
            }
        }
    }

    /// Print the timeline, newest first
    pub fn print_notes(&self, notes: &[&Note]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No memories yet. Capture one with `lane add`.");
                    return;
                }
                let now = Utc::now();
                for note in notes {
                    println!("{}", timeline_header(note, now));
                    println!("    {}", preview(&note.content).replace('\n', " "));
                    let mut footer = Vec::new();
                    if let Some(address) = &note.location.address {
                        footer.push(address.clone());
                    }
                    if !note.tags.is_empty() {
                        footer.push(format_tags(&note.tags));
                    }
                    if !footer.is_empty() {
                        println!("    {}", footer.join("  "));
                    }
                    println!();
                }
                println!("{} note(s)", notes.len());
            }
            OutputFormat::Json => print_json(&notes),
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[TagCount]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for tag in tags {
                    println!("#{} ({})", tag.name, tag.count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => print_json(&tags),
            OutputFormat::Quiet => {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
        }
    }

    /// Print the preferences record
    pub fn print_preferences(&self, prefs: &UserPreferences) {
        match self.format {
            OutputFormat::Human => {
                println!("Preferences:");
                println!("  theme:                     {}", prefs.theme);
                println!("  font_size:                 {}", prefs.font_size);
                println!("  animations_enabled:        {}", prefs.animations_enabled);
                println!("  reduced_motion:            {}", prefs.reduced_motion);
                println!("  default_capture_mode:      {}", prefs.default_capture_mode);
                println!(
                    "  location_tracking_enabled: {}",
                    prefs.location_tracking_enabled
                );
                println!("  voice_input_enabled:       {}", prefs.voice_input_enabled);
                println!("  auto_save:                 {}", prefs.auto_save);
            }
            OutputFormat::Json => print_json(prefs),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// First line of a timeline entry: id, favorite star, title and age
pub fn timeline_header(note: &Note, now: DateTime<Utc>) -> String {
    let star = if note.is_favorite { "★ " } else { "" };
    format!(
        "{} | {}{} | {}",
        note.id.short(),
        star,
        note.display_title(),
        time_ago(note.created_at, now)
    )
}

/// Relative age: minutes under an hour, hours under a day, then days
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes().max(0);
    if minutes < 60 {
        format!("{}min ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (24 * 60))
    }
}

/// Content cut to the preview length, with "..." when cut
pub fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        content.to_string()
    } else {
        let cut: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_time_ago() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "0min ago");
        assert_eq!(time_ago(now - Duration::minutes(2), now), "2min ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59min ago");
        assert_eq!(time_ago(now - Duration::minutes(60), now), "1h ago");
        assert_eq!(time_ago(now - Duration::minutes(179), now), "2h ago");
        assert_eq!(time_ago(now - Duration::hours(24), now), "1d ago");
        assert_eq!(time_ago(now - Duration::days(10), now), "10d ago");
    }

    #[test]
    fn test_time_ago_future_is_now() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::minutes(5), now), "0min ago");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");

        let exact = "a".repeat(100);
        assert_eq!(preview(&exact), exact);

        let long = "b".repeat(101);
        assert_eq!(preview(&long), format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn test_preview_counts_characters() {
        let long = "é".repeat(120);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), 103);
    }

    #[test]
    fn test_timeline_header() {
        let now = Utc::now();
        let mut note = Note::with_id("0123456789abcdef", "body");
        note.created_at = now - Duration::hours(3);
        assert_eq!(timeline_header(&note, now), "01234567 | Untitled | 3h ago");

        note.title = Some("Weekend Plans".to_string());
        note.is_favorite = true;
        assert_eq!(
            timeline_header(&note, now),
            "01234567 | ★ Weekend Plans | 3h ago"
        );
    }
}
