//! Droptui: match-3 drop puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use droptui::{Color, Engine, EngineConfig};
use std::path::PathBuf;

/// Presentation options derived from the CLI (animation timing).
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    pub no_animation: bool,
    pub fade_ms: u32,
    pub fall_ms_per_row: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let palette = if args.high_color {
        Color::ALL.to_vec()
    } else {
        Color::CLASSIC.to_vec()
    };
    let engine_config = EngineConfig {
        size: args.size,
        palette,
        seed: args.seed,
    };
    let engine = Engine::new(engine_config).context("invalid board configuration")?;
    let presenter = PresenterConfig {
        no_animation: args.no_animation,
        fade_ms: args.fade_ms,
        fall_ms_per_row: args.fall_ms,
    };
    let mut app = App::new(engine, presenter, theme);
    app.run()?;
    Ok(())
}

/// Route `log` output to a file; the terminal belongs to the UI.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Match-3 drop puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "droptui",
    version,
    about = "Match-3 drop puzzle in the terminal. Swap neighbouring drops to line up three of a colour.",
    long_about = "Droptui is a terminal match-3 puzzle.\n\n\
        Swap two neighbouring drops. A swap only stands if it lines up three or more drops of \
        one colour in a row or column; matched drops vanish, the drops above fall into the gaps \
        and new lines that form are cleared in turn.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor   Enter / Space  Select or swap\n  \
        Mouse click    Select or swap R  New board     Q / Esc  Quit\n\n\
        Selecting a drop that is not next to the current selection selects it instead."
)]
pub struct Args {
    /// Board size (cells per side).
    #[arg(short, long, default_value = "8", value_name = "N")]
    pub size: usize,

    /// High color mode: use 6 colours (adds magenta and cyan) instead of 4.
    #[arg(long)]
    pub high_color: bool,

    /// Seed for reproducible boards.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable animations (instant removal and landing).
    #[arg(long)]
    pub no_animation: bool,

    /// Fade-out time of matched drops in ms.
    #[arg(long, default_value = "300", value_name = "MS")]
    pub fade_ms: u32,

    /// Fall time per row in ms.
    #[arg(long, default_value = "70", value_name = "MS")]
    pub fall_ms: u64,

    /// Write engine logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
