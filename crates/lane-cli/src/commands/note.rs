//! Note command handlers

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use lane_core::{CaptureMode, MemoryLane, Note, NoteDraft, NoteId, NotePatch};

use crate::editor::{confirm, edit_text, note_template, parse_note_template};
use crate::output::{preview, Output, TagCount};

/// Fields for a new note, as given on the command line
#[derive(Debug, Default)]
pub struct AddArgs {
    pub content: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub mode: Option<CaptureMode>,
}

/// Capture a new note
///
/// Without content on the command line the note is written in $EDITOR
/// and recorded as a detailed capture unless a mode was given.
pub fn add(lane: &mut MemoryLane, args: AddArgs, output: &Output) -> Result<()> {
    let AddArgs {
        content,
        mut title,
        mut tags,
        favorite,
        mut mode,
    } = args;

    let content = match content {
        Some(content) => content,
        None => {
            let edited = edit_text(&note_template(title.as_deref(), &tags, ""))
                .context("Failed to edit note")?;
            let edited = parse_note_template(&edited);
            if edited.content.is_empty() {
                output.message("Empty note, nothing saved.");
                return Ok(());
            }
            title = edited.title;
            tags = edited.tags;
            mode = mode.or(Some(CaptureMode::Detailed));
            edited.content
        }
    };

    let mut draft = NoteDraft::new(content).tags(tags).favorite(favorite);
    if let Some(title) = title {
        draft = draft.title(title);
    }
    if let Some(mode) = mode {
        draft = draft.capture_mode(mode);
    }

    let note = lane.create_note(draft).context("Failed to save note")?;

    if output.is_quiet() {
        println!("{}", note.id);
    } else {
        output.success(&format!("Added note {}", note.id.short()));
    }
    Ok(())
}

/// List the timeline, optionally filtered
pub fn list(lane: &MemoryLane, tag: Option<String>, favorites: bool, output: &Output) -> Result<()> {
    if let Some(error) = lane.error() {
        eprintln!("⚠ {}", error);
    }

    let notes: Vec<&Note> = lane
        .notes()
        .iter()
        .filter(|n| !favorites || n.is_favorite)
        .filter(|n| tag.as_deref().map_or(true, |t| n.has_tag(t)))
        .collect();

    output.print_notes(&notes);
    Ok(())
}

/// Show one note in full
pub fn show(lane: &MemoryLane, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_id(lane, &id)?;
    let note = lane
        .get_note(&note_id)
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?;
    output.print_note(note);
    Ok(())
}

/// Fields to change on an existing note
#[derive(Debug, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub clear_title: bool,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none() && !self.clear_title && self.content.is_none() && self.tags.is_none()
    }
}

/// Edit a note from flags, or in $EDITOR when no flags are given
pub fn edit(lane: &mut MemoryLane, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let note_id = resolve_id(lane, &id)?;
    let note = lane
        .get_note(&note_id)
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?
        .clone();

    let mut patch = NotePatch::new(note_id.clone());
    if args.is_empty() {
        let template = note_template(note.title.as_deref(), &note.tags, &note.content);
        let edited = parse_note_template(&edit_text(&template).context("Failed to edit note")?);
        if edited.content.is_empty() {
            output.message("Empty content, note left unchanged.");
            return Ok(());
        }
        patch = patch.title(edited.title).content(edited.content).tags(edited.tags);
    } else {
        if args.clear_title {
            patch = patch.title(None);
        } else if let Some(title) = args.title {
            patch = patch.title(Some(title));
        }
        if let Some(content) = args.content {
            patch = patch.content(content);
        }
        if let Some(tags) = args.tags {
            patch = patch.tags(tags);
        }
    }

    let Some(updated) = lane.edit_note(patch).context("Failed to save note")? else {
        bail!("Note not found: {}", id);
    };

    if updated.content == note.content && updated.title == note.title && updated.tags == note.tags
    {
        output.message("No changes.");
    } else {
        output.success(&format!("Updated note {}", updated.id.short()));
    }
    Ok(())
}

/// Delete a note
pub fn delete(lane: &mut MemoryLane, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_id(lane, &id)?;

    if output.should_prompt() {
        if let Some(note) = lane.get_note(&note_id) {
            println!(
                "Delete note: {} - {}",
                note.id.short(),
                preview(&note.content).replace('\n', " ")
            );
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if lane.delete_note(&note_id).is_none() {
        bail!("Note not found: {}", id);
    }
    output.success(&format!("Deleted note: {}", note_id.short()));
    Ok(())
}

/// Flip the favorite flag
pub fn favorite(lane: &mut MemoryLane, id: String, output: &Output) -> Result<()> {
    let note_id = resolve_id(lane, &id)?;
    if !lane.toggle_favorite(&note_id) {
        bail!("Note not found: {}", id);
    }

    let is_favorite = lane.get_note(&note_id).is_some_and(|n| n.is_favorite);
    let verb = if is_favorite { "Favorited" } else { "Unfavorited" };
    output.success(&format!("{} note {}", verb, note_id.short()));
    Ok(())
}

/// List tags with usage counts, most used first
pub fn tags(lane: &MemoryLane, output: &Output) -> Result<()> {
    output.print_tags(&count_tags(lane.notes()));
    Ok(())
}

/// Insert the sample timeline
pub fn seed(lane: &mut MemoryLane, output: &Output) -> Result<()> {
    let count = lane.seed_sample_notes();
    output.success(&format!("Added {} sample notes", count));
    Ok(())
}

pub(crate) fn count_tags(notes: &[Note]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in notes.iter().flat_map(|n| n.tags.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags
}

/// Resolve a note ID (supports full ID or prefix)
pub(crate) fn resolve_id(lane: &MemoryLane, id: &str) -> Result<NoteId> {
    if let Some(note) = lane.find_by_prefix(id) {
        return Ok(note.id.clone());
    }

    let matches: Vec<&Note> = lane
        .notes()
        .iter()
        .filter(|n| !id.is_empty() && n.id.as_str().starts_with(id))
        .collect();

    if matches.is_empty() {
        bail!("No note found matching: {}", id);
    }

    eprintln!("Multiple notes match '{}':", id);
    for note in &matches {
        eprintln!("  {} - {}", note.id.short(), note.display_title());
    }
    bail!("Ambiguous ID. Please provide more characters.");
}
