// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use setlist_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("setlist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Playlist editor with unlimited undo and redo")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the playlist store (overrides config)")
                .global(true),
        )
        .subcommand(
            Command::new("list")
                .about("List the songs in the playlist")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print songs as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a song to the end of the playlist")
                .arg(Arg::new("name").required(true).value_name("NAME").help("Song name (max 50 characters)"))
                .arg(Arg::new("artist").required(true).value_name("ARTIST").help("Artist (max 30 characters)")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a song by id or list position")
                .arg(Arg::new("id").required(true).value_name("ID|POSITION").help("Song id, or its 1-based position in 'list'"))
                .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove every song from the playlist")
                .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("undo").about("Undo the last change"))
        .subcommand(Command::new("redo").about("Redo the last undone change"))
        .subcommand(Command::new("status").about("Show playlist and history position"))
        .subcommand(
            Command::new("reset")
                .about("Delete the saved playlist and its history")
                .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("config")
                .about("Show resolved configuration")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .help("Write a default config file if none exists")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn load_config(manager: &ConfigManager) -> Config {
    match manager.load_with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}, using defaults", e);
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;

    let mut config = load_config(&manager);
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.app.data_dir = Some(PathBuf::from(dir));
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    if let Some(("config", sub_matches)) = matches.subcommand() {
        return commands::show_config(&manager, &config, sub_matches);
    }

    let Some((name, sub_matches)) = matches.subcommand() else {
        build_cli().print_help()?;
        return Ok(());
    };

    let mut session = commands::open_session(&manager, &config)?;
    commands::load_session(&mut session).await;

    let result = match name {
        "list" => commands::list_songs(&session, sub_matches),
        "add" => commands::add_song(&mut session, sub_matches),
        "remove" => commands::remove_song(&mut session, sub_matches),
        "clear" => commands::clear_playlist(&mut session, sub_matches),
        "undo" => commands::undo(&mut session),
        "redo" => commands::redo(&mut session),
        "status" => commands::show_status(&session),
        "reset" => commands::reset(&mut session, sub_matches).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    };

    session.flush().await;
    result
}
