use super::*;
use clap::ArgMatches;
use setlist_core::{PlaylistAction, SongId};
use tempfile::TempDir;

fn sub_matches(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["setlist"];
    argv.extend_from_slice(args);
    let matches = crate::build_cli()
        .try_get_matches_from(argv)
        .expect("valid arguments");
    let (_, sub) = matches.subcommand().expect("subcommand given");
    sub.clone()
}

fn file_config(temp_dir: &TempDir) -> (ConfigManager, Config) {
    let manager = ConfigManager::with_directory(temp_dir.path().join("config"))
        .expect("manager");
    let mut config = Config::default();
    config.app.data_dir = Some(temp_dir.path().join("data"));
    (manager, config)
}

fn state_with(names: &[&str]) -> PlaylistState {
    let mut state = PlaylistState::new();
    for name in names {
        state.apply(PlaylistAction::add_song(*name, "Artist"));
    }
    state
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("12345678", 8), "12345678");
    assert_eq!(truncate("123456789", 8), "12345678...");
    assert_eq!(truncate("ééééé", 3), "ééé...");
}

#[test]
fn test_format_history_position() {
    assert_eq!(format_history_position(&PlaylistState::new()), "step 0 of 0");

    let mut state = state_with(&["a", "b"]);
    assert_eq!(format_history_position(&state), "step 2 of 2");
    state.apply(PlaylistAction::Undo);
    assert_eq!(format_history_position(&state), "step 1 of 2");
}

#[test]
fn test_format_song_line() {
    let state = state_with(&["Lose Yourself"]);
    let song = &state.songs()[0];
    let line = format_song_line(1, song);

    assert!(line.starts_with("  1. Lose Yourself - Artist"));
    assert!(line.contains(song.id.as_str()));
}

#[test]
fn test_resolve_song_id_prefers_exact_id() {
    let state = state_with(&["a", "b"]);
    let second = state.songs()[1].id.clone();

    assert_eq!(resolve_song_id(&state, second.as_str()), second);
}

#[test]
fn test_resolve_song_id_by_position() {
    let state = state_with(&["a", "b"]);

    assert_eq!(resolve_song_id(&state, "1"), state.songs()[0].id);
    assert_eq!(resolve_song_id(&state, "2"), state.songs()[1].id);
}

#[test]
fn test_resolve_song_id_falls_back_to_raw_id() {
    let state = state_with(&["a"]);

    assert_eq!(resolve_song_id(&state, "0"), SongId::from_string("0"));
    assert_eq!(resolve_song_id(&state, "7"), SongId::from_string("7"));
    assert_eq!(resolve_song_id(&state, "nope"), SongId::from_string("nope"));
}

#[tokio::test]
async fn test_commands_persist_across_sessions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);

    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;
    add_song(&mut session, &sub_matches(&["add", "Hurt", "Johnny Cash"]))?;
    add_song(&mut session, &sub_matches(&["add", " Jolene ", "Dolly Parton"]))?;
    remove_song(&mut session, &sub_matches(&["remove", "1", "--force"]))?;
    session.flush().await;
    drop(session);

    assert!(temp_dir.path().join("data").join("playlist.json").exists());

    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;
    let names: Vec<_> = session.state().songs().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Jolene".to_string()]);

    undo(&mut session)?;
    assert_eq!(session.state().len(), 2);
    redo(&mut session)?;
    assert_eq!(session.state().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_add_rejects_overlong_name() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);
    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;

    let long_name = "x".repeat(51);
    let err = add_song(&mut session, &sub_matches(&["add", &long_name, "Artist"]))
        .expect_err("name too long");
    assert!(err.to_string().contains("50"));
    assert!(session.state().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_forced_clear_and_reset() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);
    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;

    add_song(&mut session, &sub_matches(&["add", "Hurt", "Johnny Cash"]))?;
    clear_playlist(&mut session, &sub_matches(&["clear", "--force"]))?;
    assert!(session.state().is_empty());
    assert!(session.can_undo());

    reset(&mut session, &sub_matches(&["reset", "--force"])).await?;
    assert!(session.persistence().try_load()?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_remove_unknown_id_still_undoable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, mut config) = file_config(&temp_dir);
    config.storage.backend = StorageBackend::Memory;
    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;

    remove_song(&mut session, &sub_matches(&["remove", "missing-id"]))?;
    assert!(session.can_undo());
    assert!(session.state().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_store_starts_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);
    std::fs::create_dir_all(temp_dir.path().join("data"))?;
    std::fs::write(temp_dir.path().join("data").join("playlist.json"), "{{{")?;

    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;
    assert!(session.is_loaded());
    assert!(session.state().is_empty());

    add_song(&mut session, &sub_matches(&["add", "Hurt", "Johnny Cash"]))?;
    session.flush().await;
    drop(session);

    let mut session = open_session(&manager, &config)?;
    assert_eq!(session.load().await, LoadOutcome::Restored);
    assert_eq!(session.state().len(), 1);
    assert_eq!(session.state().songs()[0].name, "Hurt");
    Ok(())
}

#[tokio::test]
async fn test_reset_after_unreadable_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);
    std::fs::create_dir_all(temp_dir.path().join("data"))?;
    std::fs::write(temp_dir.path().join("data").join("playlist.json"), "{{{")?;

    let mut session = open_session(&manager, &config)?;
    load_session(&mut session).await;
    reset(&mut session, &sub_matches(&["reset", "--force"])).await?;

    let mut session = open_session(&manager, &config)?;
    assert_eq!(session.load().await, LoadOutcome::NotFound);
    Ok(())
}

#[test]
fn test_remove_parses_force_flag() {
    let matches = sub_matches(&["remove", "2", "-f"]);
    assert!(matches.get_flag("force"));
    assert_eq!(matches.get_one::<String>("id").map(String::as_str), Some("2"));

    let matches = sub_matches(&["remove", "2"]);
    assert!(!matches.get_flag("force"));
}

#[test]
fn test_show_config_init_writes_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (manager, config) = file_config(&temp_dir);

    show_config(&manager, &config, &sub_matches(&["config", "--init"]))?;
    assert!(manager.config_path().exists());
    Ok(())
}
