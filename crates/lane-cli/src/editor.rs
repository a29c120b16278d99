//! Interactive editing support
//!
//! Opens $EDITOR on a small note template:
//!
//! ```text
//! Title: Weekend Plans
//! Tags: personal, weekend
//! ---
//! Things to do this weekend...
//! ```
//!
//! Everything after the `---` line is the note content.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

const SEPARATOR: &str = "---";

/// Fields recovered from an edited template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditedNote {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub content: String,
}

/// Render a note as an editable template
pub fn note_template(title: Option<&str>, tags: &[String], content: &str) -> String {
    format!(
        "Title: {}\nTags: {}\n{}\n{}",
        title.unwrap_or(""),
        tags.join(", "),
        SEPARATOR,
        content
    )
}

/// Parse an edited template
///
/// Text without a separator line is treated as bare content.
pub fn parse_note_template(text: &str) -> EditedNote {
    let lines: Vec<&str> = text.lines().collect();
    let Some(sep) = lines.iter().position(|l| l.trim() == SEPARATOR) else {
        return EditedNote {
            content: text.trim().to_string(),
            ..Default::default()
        };
    };

    let mut edited = EditedNote {
        content: lines[sep + 1..].join("\n").trim().to_string(),
        ..Default::default()
    };

    for line in &lines[..sep] {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "title" if !value.is_empty() => edited.title = Some(value.to_string()),
            "tags" => {
                edited.tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }

    edited
}

/// Open content in the user's preferred editor
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let temp_path = env::temp_dir().join(format!("lane_edit_{}.md", std::process::id()));

    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(&temp_path)
        .with_context(|| format!("Failed to read edited file: {:?}", temp_path))?;

    let _ = fs::remove_file(&temp_path);

    Ok(content)
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];

    for editor in common_editors {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_round_trip() {
        let tags = vec!["personal".to_string(), "weekend".to_string()];
        let text = note_template(Some("Weekend Plans"), &tags, "Call parents");

        let edited = parse_note_template(&text);
        assert_eq!(edited.title.as_deref(), Some("Weekend Plans"));
        assert_eq!(edited.tags, tags);
        assert_eq!(edited.content, "Call parents");
    }

    #[test]
    fn test_blank_title_and_tags() {
        let edited = parse_note_template(&note_template(None, &[], "body\n\nmore"));
        assert!(edited.title.is_none());
        assert!(edited.tags.is_empty());
        assert_eq!(edited.content, "body\n\nmore");
    }

    #[test]
    fn test_content_may_contain_colons_and_separators() {
        let text = "Title: t\n---\nKey points: one\n---\nafter rule\n";
        let edited = parse_note_template(text);
        assert_eq!(edited.title.as_deref(), Some("t"));
        assert_eq!(edited.content, "Key points: one\n---\nafter rule");
    }

    #[test]
    fn test_bare_text_is_content() {
        let edited = parse_note_template("  just a thought \n");
        assert_eq!(edited.content, "just a thought");
        assert!(edited.title.is_none());
    }

    #[test]
    fn test_command_exists() {
        #[cfg(unix)]
        assert!(command_exists("ls"));

        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }
}
