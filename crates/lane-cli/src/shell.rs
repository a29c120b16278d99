//! Interactive session
//!
//! A one-shot `lane delete` exits before anyone could undo it. The shell
//! keeps the application open, so the undo window is live: deletes can be
//! taken back with `undo` until the window closes, and the closing is
//! announced as it happens.

use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use lane_core::{LifecycleEvent, MemoryLane};

use crate::commands::note::{self, AddArgs};
use crate::output::Output;

const HELP: &str = "\
Commands:
  add <text>      capture a note
  list            show the timeline
  show <id>       show one note
  delete <id>     delete a note (undoable for a few seconds)
  undo            restore the last deleted note
  fav <id>        toggle favorite
  tags            list tags
  help            show this help
  quit            leave the shell";

/// What the loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run the shell until `quit` or end of input
pub async fn run(lane: &mut MemoryLane, output: &Output) -> Result<()> {
    let mut events = lane.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Memory Lane shell. Type `help` for commands.");
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if handle_line(lane, &line, output) == Flow::Quit {
                    break;
                }
                lane.flush().await;
                prompt()?;
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(text) = describe_event(&event) {
                            println!();
                            println!("{}", text);
                            prompt()?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Shell missed {} lifecycle events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    if let Some(id) = lane.commit_pending() {
        debug!("Committed pending delete of {} on exit", id);
    }
    Ok(())
}

/// Execute one shell line. Errors are printed, never fatal.
pub fn handle_line(lane: &mut MemoryLane, line: &str, output: &Output) -> Flow {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let result = match command {
        "" => Ok(()),
        "add" | "a" => {
            if rest.is_empty() {
                println!("Usage: add <text>");
                Ok(())
            } else {
                let args = AddArgs {
                    content: Some(rest.to_string()),
                    ..Default::default()
                };
                note::add(lane, args, output)
            }
        }
        "list" | "ls" => note::list(lane, None, false, output),
        "show" => note::show(lane, rest.to_string(), output),
        "delete" | "rm" => delete(lane, rest),
        "undo" | "u" => {
            match lane.undo_delete() {
                Some(note) => println!("Restored {} | {}", note.id.short(), note.display_title()),
                None => println!("Nothing to undo."),
            }
            Ok(())
        }
        "fav" | "favorite" => note::favorite(lane, rest.to_string(), output),
        "tags" => note::tags(lane, output),
        "help" | "?" => {
            println!("{}", HELP);
            Ok(())
        }
        "quit" | "exit" | "q" => return Flow::Quit,
        other => {
            println!("Unknown command '{}'. Type `help` for commands.", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        println!("Error: {:#}", e);
    }
    Flow::Continue
}

/// Shell deletes skip confirmation; `undo` is the safety net
fn delete(lane: &mut MemoryLane, id: &str) -> Result<()> {
    let note_id = note::resolve_id(lane, id)?;
    if lane.delete_note(&note_id).is_some() {
        println!(
            "Deleted {}. Type `undo` within {}s to restore it.",
            note_id.short(),
            lane.undo_window().as_secs()
        );
    }
    Ok(())
}

/// Text announcing a lifecycle event, if it is worth announcing
pub fn describe_event(event: &LifecycleEvent) -> Option<String> {
    match event {
        // Already reported by the delete command itself
        LifecycleEvent::UndoAvailable { .. } | LifecycleEvent::Restored { .. } => None,
        LifecycleEvent::DeletionCommitted { note_id } => Some(format!(
            "Undo window closed; {} is gone for good.",
            note_id.short()
        )),
    }
}

fn prompt() -> io::Result<()> {
    print!("lane> ");
    io::stdout().flush()
}
