//! Layers built-in presets, the config file and CLI flags into the values
//! handed to the renderer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use backdrop::{EffectParameters, Rgba};
use effectconfig::{BackdropConfig, EffectSection};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 720);
pub const DEFAULT_TITLE: &str = "shardsky";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserDefault(PathBuf),
    BuiltIn,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Explicit(path) => format!("{} (--config)", path.display()),
            ConfigSource::UserDefault(path) => path.display().to_string(),
            ConfigSource::BuiltIn => "built-in defaults".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub source: ConfigSource,
    pub parameters: EffectParameters,
    pub window_size: (u32, u32),
    pub title: String,
}

/// Look-and-feel of the wizard backdrop: two cool accents, no rotation and
/// no pointer tracking.
pub fn host_preset() -> EffectSection {
    EffectSection {
        color1: Some("#0891B2".into()),
        color2: Some("#7C3AED".into()),
        pixel_filter: Some(600.0),
        rotate: Some(false),
        mouse_interaction: Some(false),
        ..EffectSection::default()
    }
}

/// Loads `explicit` if given, otherwise the user's `backdrop.toml` when it
/// exists, otherwise nothing.
pub fn load_config(
    explicit: Option<&Path>,
    default_path: &Path,
) -> Result<(BackdropConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = BackdropConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    if default_path.is_file() {
        let config = BackdropConfig::load(default_path).with_context(|| {
            format!(
                "failed to load configuration from {}",
                default_path.display()
            )
        })?;
        return Ok((config, ConfigSource::UserDefault(default_path.to_path_buf())));
    }

    Ok((BackdropConfig::default(), ConfigSource::BuiltIn))
}

/// CLI flags expressed as an overlay; unset flags leave the file untouched.
pub fn cli_overrides(args: &RunArgs) -> EffectSection {
    EffectSection {
        color1: args.color1.clone(),
        color2: args.color2.clone(),
        color3: args.color3.clone(),
        pixel_filter: args.pixel_filter,
        transition: args.transition,
        rotate: args.rotate.then_some(true),
        mouse_interaction: args.mouse.then_some(true),
        ..EffectSection::default()
    }
}

pub fn resolve(args: &RunArgs, paths: &AppPaths) -> Result<ResolvedConfig> {
    let (config, source) = load_config(args.config.as_deref(), &paths.config_file())?;
    Ok(resolve_with(config, source, args))
}

pub fn resolve_with(config: BackdropConfig, source: ConfigSource, args: &RunArgs) -> ResolvedConfig {
    let mut effect = host_preset();
    effect.overlay(&config.effect);
    effect.overlay(&cli_overrides(args));

    let window_size = args
        .size
        .or(config.window.size.map(|[width, height]| (width, height)))
        .unwrap_or(DEFAULT_WINDOW_SIZE);
    let title = args
        .title
        .clone()
        .or(config.window.title)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    ResolvedConfig {
        source,
        parameters: effect_parameters(&effect),
        window_size,
        title,
    }
}

/// Applies every set key of `section` on top of the renderer defaults.
pub fn effect_parameters(section: &EffectSection) -> EffectParameters {
    let mut params = EffectParameters::default();
    if let Some(value) = section.spin_rotation {
        params.spin_rotation = value;
    }
    if let Some(value) = section.spin_speed {
        params.spin_speed = value;
    }
    if let Some(value) = section.offset {
        params.offset = value;
    }
    if let Some(value) = &section.color1 {
        params.color1 = Rgba::from_hex_or_transparent(value);
    }
    if let Some(value) = &section.color2 {
        params.color2 = Rgba::from_hex_or_transparent(value);
    }
    if let Some(value) = &section.color3 {
        params.color3 = Rgba::from_hex_or_transparent(value);
    }
    if let Some(value) = section.contrast {
        params.contrast = value;
    }
    if let Some(value) = section.lighting {
        params.lighting = value;
    }
    if let Some(value) = section.spin_amount {
        params.spin_amount = value;
    }
    if let Some(value) = section.pixel_filter {
        params.pixel_filter = value;
    }
    if let Some(value) = section.spin_ease {
        params.spin_ease = value;
    }
    if let Some(value) = section.rotate {
        params.rotate = value;
    }
    if let Some(value) = section.mouse_interaction {
        params.mouse_interaction = value;
    }
    if let Some(value) = section.transition {
        params.transition = value;
    }
    params
}

/// Fully populated section describing `params`, for display.
pub fn describe_parameters(params: &EffectParameters) -> EffectSection {
    EffectSection {
        spin_rotation: Some(params.spin_rotation),
        spin_speed: Some(params.spin_speed),
        offset: Some(params.offset),
        color1: Some(params.color1.to_string()),
        color2: Some(params.color2.to_string()),
        color3: Some(params.color3.to_string()),
        contrast: Some(params.contrast),
        lighting: Some(params.lighting),
        spin_amount: Some(params.spin_amount),
        pixel_filter: Some(params.pixel_filter),
        spin_ease: Some(params.spin_ease),
        rotate: Some(params.rotate),
        mouse_interaction: Some(params.mouse_interaction),
        transition: Some(params.transition),
    }
}
