// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::ArgMatches;
use console::style;
use setlist_config::{Config, ConfigManager, StorageBackend};
use setlist_core::{PlaylistState, Song, SongDraft, SongId, Timestamp};
use setlist_session::{LoadOutcome, PlaylistSession};
use setlist_storage::{FileStore, KeyValueStore, MemoryStore, SongRecord};
use std::sync::Arc;

/// Builds the store named by the config and opens a session on it
pub fn open_session(manager: &ConfigManager, config: &Config) -> Result<PlaylistSession> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => {
            let path = manager
                .store_path(config)
                .context("Failed to resolve playlist store path")?
                .ok_or_else(|| anyhow!("File backend has no store path"))?;
            log::debug!("Using playlist store at {}", path.display());
            Arc::new(FileStore::new(path))
        }
        StorageBackend::Memory => {
            log::warn!("Memory backend selected, changes will not outlive this command");
            Arc::new(MemoryStore::new())
        }
    };

    PlaylistSession::from_config(store, &config.storage, &config.session)
        .context("Failed to start playlist session")
}

/// Loads the saved playlist, reporting unreadable data
pub async fn load_session(session: &mut PlaylistSession) {
    if let LoadOutcome::Failed(reason) = session.load().await {
        eprintln!(
            "{} Saved playlist could not be read ({}), starting empty",
            style("!").yellow().bold(),
            reason
        );
    }
}

/// List all songs in the playlist
pub fn list_songs(session: &PlaylistSession, matches: &ArgMatches) -> Result<()> {
    let songs = session.state().songs();

    if matches.get_flag("json") {
        let records = songs
            .iter()
            .map(SongRecord::from_song)
            .collect::<setlist_core::Result<Vec<_>>>()
            .context("Failed to encode songs")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to encode songs")?
        );
        return Ok(());
    }

    if songs.is_empty() {
        println!("Playlist is empty. Use 'add' to add songs.");
        return Ok(());
    }

    println!("\n{} Songs in Playlist", style(songs.len()).bold().cyan());
    println!("{}", "=".repeat(80));

    for (index, song) in songs.iter().enumerate() {
        println!("{}", format_song_line(index + 1, song));
    }

    Ok(())
}

/// Add a song to the playlist
pub fn add_song(session: &mut PlaylistSession, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("Song name is required"))?;
    let artist = matches
        .get_one::<String>("artist")
        .ok_or_else(|| anyhow!("Artist is required"))?;

    let id = session
        .add_song(SongDraft::new(name, artist))
        .map_err(|e| anyhow!(e.user_message()))?;

    let song = session
        .state()
        .find(&id)
        .ok_or_else(|| anyhow!("Added song not found"))?;

    println!("{} Song added!", style("✓").green().bold());
    println!("  ID: {}", song.id);
    println!("  Name: {}", song.name);
    println!("  Artist: {}", song.artist);

    Ok(())
}

/// Remove a song by id or position
pub fn remove_song(session: &mut PlaylistSession, matches: &ArgMatches) -> Result<()> {
    let target = matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("Song id is required"))?;

    let id = resolve_song_id(session.state(), target);
    match session.state().find(&id).cloned() {
        Some(song) => {
            let prompt = format!("Remove \"{}\" by {}?", song.name, song.artist);
            if !matches.get_flag("force") && !confirm(&prompt)? {
                println!("Remove cancelled.");
                return Ok(());
            }

            session.remove_song(id);
            println!(
                "{} Removed '{}' by {}",
                style("✓").green().bold(),
                song.name,
                song.artist
            );
        }
        None => {
            // An unmatched removal still records a history entry.
            session.remove_song(id);
            println!(
                "{} No song matches '{}'; nothing removed",
                style("!").yellow().bold(),
                target
            );
        }
    }

    Ok(())
}

/// Clear the playlist
pub fn clear_playlist(session: &mut PlaylistSession, matches: &ArgMatches) -> Result<()> {
    let count = session.state().len();
    if count == 0 {
        println!("Playlist is already empty.");
        return Ok(());
    }

    if !matches.get_flag("force") && !confirm(&format!("Remove all {} songs?", count))? {
        println!("Clear cancelled.");
        return Ok(());
    }

    session.clear_playlist();
    println!(
        "{} Cleared {} songs (use 'undo' to restore)",
        style("✓").green().bold(),
        count
    );
    Ok(())
}

pub fn undo(session: &mut PlaylistSession) -> Result<()> {
    if !session.can_undo() {
        println!("Nothing to undo.");
        return Ok(());
    }

    session.undo();
    println!(
        "{} Undone ({} songs now)",
        style("↶").green().bold(),
        session.state().len()
    );
    Ok(())
}

pub fn redo(session: &mut PlaylistSession) -> Result<()> {
    if !session.can_redo() {
        println!("Nothing to redo.");
        return Ok(());
    }

    session.redo();
    println!(
        "{} Redone ({} songs now)",
        style("↷").green().bold(),
        session.state().len()
    );
    Ok(())
}

/// Show playlist and history position
pub fn show_status(session: &PlaylistSession) -> Result<()> {
    let state = session.state();

    println!("\n{}", style("Playlist Status").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Songs: {}", style(state.len()).bold());
    println!("History: {}", format_history_position(state));
    println!("Can undo: {}", yes_no(state.can_undo()));
    println!("Can redo: {}", yes_no(state.can_redo()));
    println!("Save mode: {}", session.save_mode());

    Ok(())
}

/// Delete the saved playlist
pub async fn reset(session: &mut PlaylistSession, matches: &ArgMatches) -> Result<()> {
    if !matches.get_flag("force") && !confirm("Delete the saved playlist and its history?")? {
        println!("Reset cancelled.");
        return Ok(());
    }

    session
        .clear_persisted()
        .await
        .context("Failed to delete saved playlist")?;

    println!("{} Saved playlist deleted", style("✓").green().bold());
    Ok(())
}

/// Show resolved configuration
pub fn show_config(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    if matches.get_flag("init") {
        let created = manager
            .initialize()
            .context("Failed to write default config")?;
        if created {
            println!(
                "{} Wrote {}",
                style("✓").green().bold(),
                manager.config_path().display()
            );
        }
    }

    println!("\n{}", style("Configuration").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Config file: {}", manager.config_path().display());
    println!("Log level: {}", config.app.log_level);
    println!("Backend: {}", config.storage.backend);
    match manager.store_path(config) {
        Ok(Some(path)) => println!("Store file: {}", path.display()),
        Ok(None) => println!("Store file: (none, in memory)"),
        Err(e) => println!("Store file: unavailable ({})", e),
    }
    println!(
        "Keys: {} / {}",
        config.storage.playlist_key, config.storage.history_key
    );
    println!("Save mode: {}", config.session.save_mode);

    Ok(())
}

/// Matches an id first, then a 1-based position; otherwise the raw id
fn resolve_song_id(state: &PlaylistState, target: &str) -> SongId {
    let id = SongId::from_string(target);
    if state.find(&id).is_some() {
        return id;
    }

    target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| state.songs().get(index))
        .map(|song| song.id.clone())
        .unwrap_or(id)
}

fn confirm(prompt: &str) -> Result<bool> {
    println!("{} (y/N)", prompt);
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn format_song_line(position: usize, song: &Song) -> String {
    format!(
        "{:>3}. {} - {}  [{}]  added {}",
        position,
        truncate(&song.name, 50),
        truncate(&song.artist, 30),
        song.id,
        format_added_at(song.added_at)
    )
}

fn format_added_at(added_at: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp_millis(added_at.as_millis()) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "unknown".to_string(),
    }
}

fn format_history_position(state: &PlaylistState) -> String {
    format!(
        "step {} of {}",
        state.history_position() + 1,
        state.history().len()
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests;
