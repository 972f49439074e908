use std::fmt;

/// Normalized RGBA color; every channel lives in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    /// Fallback used whenever a hex string cannot be decoded.
    pub const TRANSPARENT: Rgba = Rgba([0.0; 4]);

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Builds a color from 8-bit channels.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes.map(|byte| byte as f32 / 255.0))
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    ///
    /// Six digits produce an opaque color, eight digits carry an explicit
    /// alpha channel. Any other length or a non-hex digit yields `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::from_bytes([channel(0)?, channel(1)?, channel(2)?, 255])),
            8 => Some(Self::from_bytes([
                channel(0)?,
                channel(1)?,
                channel(2)?,
                channel(3)?,
            ])),
            _ => None,
        }
    }

    /// Decodes `hex`, falling back to [`Rgba::TRANSPARENT`] on malformed input.
    pub fn from_hex_or_transparent(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or_else(|| {
            tracing::warn!(input = hex, "malformed color; using transparent black");
            Self::TRANSPARENT
        })
    }

    /// Quantizes each channel back to the nearest byte.
    pub fn to_bytes(self) -> [u8; 4] {
        self.0
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Formats as uppercase `#RRGGBB`, or `#RRGGBBAA` when `alpha` is set.
    pub fn to_hex(self, alpha: bool) -> String {
        let [r, g, b, a] = self.to_bytes();
        if alpha {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}")
        }
    }

    /// Channel-wise `self + (other - self) * t`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let mut out = self.0;
        for (channel, end) in out.iter_mut().zip(other.0) {
            *channel += (end - *channel) * t;
        }
        Rgba(out)
    }

    pub fn channels(self) -> [f32; 4] {
        self.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opaque = self.to_bytes()[3] == 255;
        f.write_str(&self.to_hex(!opaque))
    }
}
