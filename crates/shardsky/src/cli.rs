use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shardsky",
    author,
    version,
    about = "Animated GPU backdrop host",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Backdrop configuration file; defaults to `backdrop.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "SHARDSKY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Primary swirl color as `#RRGGBB` or `#RRGGBBAA`.
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color1: Option<String>,

    /// Secondary swirl color.
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color2: Option<String>,

    /// Background color between the paint bands.
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color3: Option<String>,

    /// Pixelation density; larger values give finer pixels.
    #[arg(long, value_name = "DENSITY", value_parser = parse_pixel_filter)]
    pub pixel_filter: Option<f32>,

    /// Length of the color cross-fade (`800ms`, `1.5s`, or plain seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_transition)]
    pub transition: Option<Duration>,

    /// Animate the swirl rotation over time.
    #[arg(long)]
    pub rotate: bool,

    /// Let the pointer position nudge the swirl.
    #[arg(long)]
    pub mouse: bool,

    /// Read newline-delimited JSON host messages from stdin.
    #[arg(long)]
    pub listen_stdin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate configuration and print the resolved effect parameters.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Configuration file to validate instead of the default location.
    #[arg(long, value_name = "FILE", env = "SHARDSKY_CONFIG")]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WIDTHxHEIGHT, e.g. 1280x720".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", height.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_color(value: &str) -> Result<String, String> {
    if effectconfig::is_hex_color(value) {
        Ok(value.trim().to_string())
    } else {
        Err(format!("'{value}' is not a #RRGGBB or #RRGGBBAA color"))
    }
}

pub fn parse_pixel_filter(value: &str) -> Result<f32, String> {
    let density: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid pixel filter '{value}'"))?;
    if !density.is_finite() || density <= 0.0 {
        return Err("pixel filter must be a positive number".into());
    }
    Ok(density)
}

pub fn parse_transition(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("transition must not be empty".into());
    }
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err("transition must be a non-negative number of seconds".into());
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid transition '{trimmed}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid transition '{trimmed}': {err}"))
}
