use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config;
use crate::domain::track::format_duration;
use crate::http::server::HttpServer;
use crate::library;
use crate::playlist::Playlist;

#[derive(Parser)]
#[command(name = "y2pro")]
#[command(version)]
#[command(about = "Browser-based audio player over a linked playlist")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run http server hosting the player
    Serve,
    /// Print the playlist in play order
    List,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let playlist =
                library::load_playlist(&cfg).with_context(|| "Failed to load playlist")?;

            let http_server = HttpServer::new(playlist, cfg.http);
            info!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::List => {
            let playlist =
                library::load_playlist(&cfg).with_context(|| "Failed to load playlist")?;
            print!("{}", render_listing(&playlist));
        }
    }

    Ok(())
}

/// One line per track, head to tail, the current one marked with `>`.
fn render_listing(playlist: &Playlist) -> String {
    if playlist.is_empty() {
        return "Playlist is empty\n".to_string();
    }

    let mut out = String::new();
    for (n, track) in playlist.iter().enumerate() {
        let marker = if playlist.is_current(track.id.as_str()) {
            '>'
        } else {
            ' '
        };
        let duration = if track.is_duration_known() {
            format_duration(track.duration_seconds)
        } else {
            "--:--".to_string()
        };
        out.push_str(&format!(
            "{marker} {:>3}. {} - {} [{duration}]  ({})\n",
            n + 1,
            track.artist,
            track.title,
            track.id
        ));
    }
    out.push_str(&format!("{} tracks\n", playlist.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::track::Track;

    #[test]
    fn test_parse_cli_args() {
        let cli = Cli::parse_from(["y2pro", "--config", "/etc/y2pro.toml", "serve"]);
        assert_eq!(cli.config, PathBuf::from("/etc/y2pro.toml"));
        assert!(matches!(cli.command, Commands::Serve));

        let cli = Cli::parse_from(["y2pro", "list"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(matches!(cli.command, Commands::List));

        assert!(Cli::try_parse_from(["y2pro"]).is_err());
    }

    #[test]
    fn test_render_listing_marks_current_track() {
        let mut playlist: Playlist = [
            Track::new("1", "Digital Love", "Daft Punk", "a.mp3"),
            Track::new("2", "Neon Nights", "Cyber Princess", "b.mp3").with_duration(198.0),
        ]
        .into_iter()
        .collect();
        playlist.next();

        let listing = render_listing(&playlist);
        let lines: Vec<_> = listing.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("    1. Daft Punk - Digital Love [--:--]"));
        assert!(lines[1].starts_with(">   2. Cyber Princess - Neon Nights [3:18]"));
        assert_eq!(lines[2], "2 tracks");
    }

    #[test]
    fn test_render_empty_listing() {
        assert_eq!(render_listing(&Playlist::new()), "Playlist is empty\n");
    }
}
