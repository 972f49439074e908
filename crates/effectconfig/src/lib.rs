use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `backdrop.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackdropConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub effect: EffectSection,
    #[serde(default)]
    pub window: WindowSection,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            effect: EffectSection::default(),
            window: WindowSection::default(),
        }
    }
}

/// `[effect]`: overrides for the backdrop parameters. Unset keys keep the
/// renderer's built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EffectSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighting: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_filter: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_ease: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouse_interaction: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub transition: Option<Duration>,
}

impl EffectSection {
    /// Copies every key set in `other` over `self`.
    pub fn overlay(&mut self, other: &EffectSection) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        take(&mut self.spin_rotation, &other.spin_rotation);
        take(&mut self.spin_speed, &other.spin_speed);
        take(&mut self.offset, &other.offset);
        take(&mut self.color1, &other.color1);
        take(&mut self.color2, &other.color2);
        take(&mut self.color3, &other.color3);
        take(&mut self.contrast, &other.contrast);
        take(&mut self.lighting, &other.lighting);
        take(&mut self.spin_amount, &other.spin_amount);
        take(&mut self.pixel_filter, &other.pixel_filter);
        take(&mut self.spin_ease, &other.spin_ease);
        take(&mut self.rotate, &other.rotate);
        take(&mut self.mouse_interaction, &other.mouse_interaction);
        take(&mut self.transition, &other.transition);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("spin_rotation", self.spin_rotation),
            ("spin_speed", self.spin_speed),
            ("contrast", self.contrast),
            ("lighting", self.lighting),
            ("spin_amount", self.spin_amount),
            ("pixel_filter", self.pixel_filter),
            ("spin_ease", self.spin_ease),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ConfigError::Invalid(format!(
                        "effect.{key} must be a finite number"
                    )));
                }
            }
        }

        if let Some(offset) = self.offset {
            if offset.iter().any(|value| !value.is_finite()) {
                return Err(ConfigError::Invalid(
                    "effect.offset must contain finite numbers".into(),
                ));
            }
        }

        if self.contrast == Some(0.0) {
            return Err(ConfigError::Invalid("effect.contrast must not be zero".into()));
        }

        if let Some(filter) = self.pixel_filter {
            if filter <= 0.0 {
                return Err(ConfigError::Invalid(
                    "effect.pixel_filter must be greater than zero".into(),
                ));
            }
        }

        for (key, value) in [
            ("color1", &self.color1),
            ("color2", &self.color2),
            ("color3", &self.color3),
        ] {
            if let Some(value) = value {
                if !is_hex_color(value) {
                    return Err(ConfigError::Invalid(format!(
                        "effect.{key} '{value}' is not a #RRGGBB or #RRGGBBAA color"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// `[window]`: geometry of the host window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Accepts `RRGGBB` or `RRGGBBAA` with an optional leading `#`.
pub fn is_hex_color(value: &str) -> bool {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    matches!(digits.len(), 6 | 8) && digits.bytes().all(|byte| byte.is_ascii_hexdigit())
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => {
            serializer.serialize_str(&humantime::format_duration(*duration).to_string())
        }
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be a non-negative number"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl BackdropConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: BackdropConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Renders the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|err| ConfigError::Invalid(format!("failed to render configuration: {err}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        self.effect.validate()?;

        if let Some([width, height]) = self.window.size {
            if width == 0 || height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "window.size must be non-zero, got {width}x{height}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1

[effect]
color1 = "#0891B2"
color2 = "#7C3AED"
pixel_filter = 600.0
rotate = false
mouse_interaction = false
offset = [0.1, -0.05]
transition = "1s 200ms"

[window]
size = [1280, 720]
title = "shardsky"
"##;

    #[test]
    fn parses_sample_config() {
        let config = BackdropConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.effect.color1.as_deref(), Some("#0891B2"));
        assert_eq!(config.effect.pixel_filter, Some(600.0));
        assert_eq!(config.effect.mouse_interaction, Some(false));
        assert_eq!(config.effect.transition, Some(Duration::from_millis(1200)));
        assert_eq!(config.effect.contrast, None);
        assert_eq!(config.window.size, Some([1280, 720]));
    }

    #[test]
    fn empty_input_is_all_defaults() {
        let config = BackdropConfig::from_toml_str("").expect("parse config");
        assert_eq!(config, BackdropConfig::default());
    }

    #[test]
    fn transition_accepts_plain_seconds() {
        let config = BackdropConfig::from_toml_str("[effect]\ntransition = 0.5\n").unwrap();
        assert_eq!(config.effect.transition, Some(Duration::from_millis(500)));

        let config = BackdropConfig::from_toml_str("[effect]\ntransition = 2\n").unwrap();
        assert_eq!(config.effect.transition, Some(Duration::from_secs(2)));

        let err = BackdropConfig::from_toml_str("[effect]\ntransition = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = BackdropConfig::from_toml_str("[effect]\ntransition = 1e30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = BackdropConfig::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_degenerate_effect_values() {
        for input in [
            "[effect]\ncontrast = 0.0\n",
            "[effect]\npixel_filter = 0.0\n",
            "[effect]\npixel_filter = -3.0\n",
            "[effect]\nlighting = nan\n",
            "[effect]\nspin_speed = inf\n",
            "[effect]\noffset = [0.0, nan]\n",
            "[effect]\ncolor2 = \"#12345\"\n",
            "[window]\nsize = [0, 720]\n",
        ] {
            let err = BackdropConfig::from_toml_str(input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {input:?}");
        }
    }

    #[test]
    fn overlay_only_replaces_set_keys() {
        let mut base = BackdropConfig::from_toml_str(SAMPLE).unwrap().effect;
        let overrides = EffectSection {
            color1: Some("#FFFFFF".into()),
            rotate: Some(true),
            ..EffectSection::default()
        };
        base.overlay(&overrides);
        assert_eq!(base.color1.as_deref(), Some("#FFFFFF"));
        assert_eq!(base.color2.as_deref(), Some("#7C3AED"));
        assert_eq!(base.rotate, Some(true));
        assert_eq!(base.pixel_filter, Some(600.0));
    }

    #[test]
    fn rendered_toml_parses_back() {
        let config = BackdropConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(BackdropConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn load_reads_files_and_reports_missing_ones() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("backdrop.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = BackdropConfig::load(&path).unwrap();
        assert_eq!(config.window.title.as_deref(), Some("shardsky"));

        let missing = dir.path().join("absent.toml");
        match BackdropConfig::load(&missing) {
            Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn hex_color_check_matches_renderer_rules() {
        assert!(is_hex_color("#DE443B"));
        assert!(is_hex_color("de443b80"));
        assert!(!is_hex_color("#DE443"));
        assert!(!is_hex_color("#GG443B"));
        assert!(!is_hex_color(""));
    }
}
