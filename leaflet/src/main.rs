use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use leaflet_core::render::render_chapter;
use leaflet_core::toc::build_table_of_contents;
use leaflet_core::{Container, TocEntry};
use leaflet_tui::{App, Theme};
use ratatui::style::Color;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leaflet", version, about = "Read an EPUB in the terminal")]
struct Cli {
    /// Path to the .epub file
    epub: PathBuf,

    /// Print every chapter as plain text to stdout and exit
    #[arg(short = 'd', long)]
    dump: bool,

    /// Wrap column for --dump output (default: no wrapping)
    #[arg(short = 'c', long, value_name = "N")]
    cols: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    if let Err(err) = run(cli) {
        eprintln!("leaflet: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// Logs go to stderr so the alternate screen and dump output stay clean;
// `LEAFLET_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_env("LEAFLET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let container = Container::open(&cli.epub)?;
    let entries = build_table_of_contents(&container)?;
    if cli.dump {
        return dump(&container, &entries, cli.cols);
    }
    let app = App::new(container, entries).with_theme(load_theme());
    app.run().context("terminal session failed")?;
    Ok(())
}

/// Render the whole book as plain text, one underlined heading per
/// chapter. Unreadable chapters are reported inline and skipped.
fn dump(container: &Container, entries: &[TocEntry], cols: Option<usize>) -> anyhow::Result<()> {
    let stdout = std::io::stdout().lock();
    let mut out = std::io::BufWriter::new(stdout);
    for entry in entries {
        let Some(path) = entry.source_path.as_deref() else {
            // Book-title pseudo-entry.
            if !entry.title.is_empty() {
                writeln!(out, "{}", entry.title)?;
                writeln!(out, "{}", "=".repeat(entry.title.chars().count()))?;
                writeln!(out)?;
            }
            continue;
        };
        let heading = if entry.title.is_empty() {
            path
        } else {
            entry.title.as_str()
        };
        writeln!(out, "{heading}")?;
        writeln!(out, "{}", "-".repeat(heading.chars().count()))?;
        match container.read_to_string(path) {
            Ok(html) => {
                for line in &render_chapter(&html, path, cols).lines {
                    writeln!(out, "{line}")?;
                }
            }
            Err(err) => {
                tracing::warn!(%path, %err, "skipping unreadable chapter");
                writeln!(out, "[unreadable chapter: {err}]")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

// Optional theme from ~/.config/leaflet/config.toml; anything missing
// or unparseable falls back to the defaults.
fn load_theme() -> Theme {
    let mut theme = Theme::default();
    let Some(proj) = ProjectDirs::from("", "", "leaflet") else {
        return theme;
    };
    let cfg_path = proj.config_dir().join("config.toml");
    let Ok(text) = std::fs::read_to_string(&cfg_path) else {
        return theme;
    };
    let Ok(value) = toml::from_str::<toml::Value>(&text) else {
        tracing::warn!(path = %cfg_path.display(), "ignoring unparseable config");
        return theme;
    };
    if let Some(table) = value.get("theme").and_then(|v| v.as_table()) {
        if let Some(name) = table.get("name").and_then(|v| v.as_str()) {
            apply_preset(&mut theme, name);
        }
        let entry = |key: &str| table.get(key).and_then(|v| v.as_str()).and_then(parse_color);
        if let Some(c) = entry("title_fg") {
            theme.title_fg = c;
        }
        if let Some(c) = entry("title_bg") {
            theme.title_bg = c;
        }
        if let Some(c) = entry("status_fg") {
            theme.status_fg = c;
        }
        if let Some(c) = entry("status_bg") {
            theme.status_bg = c;
        }
    }
    theme
}

fn apply_preset(theme: &mut Theme, name: &str) {
    match name.to_lowercase().as_str() {
        "gruvbox" => {
            theme.title_fg = Color::Black;
            theme.title_bg = Color::Yellow;
            theme.status_fg = Color::Black;
            theme.status_bg = Color::Green;
        }
        "dracula" => {
            theme.title_fg = Color::White;
            theme.title_bg = Color::Magenta;
            theme.status_fg = Color::White;
            theme.status_bg = Color::Blue;
        }
        // The compiled-in default.
        "tokyonight" => *theme = Theme::default(),
        _ => {}
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "darkgray" => Some(Color::DarkGray),
        _ => None,
    }
}
