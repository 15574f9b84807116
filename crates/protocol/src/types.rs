use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("expected 3, 6 or 8 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

/// A literal RGBA color, used where the palette comes from data rather than
/// the theme (gradient series, per-track display colors).
///
/// Serialized as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };
        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    *slot = v * 16 + v;
                }
                Ok(Self::rgb8(channels[0], channels[1], channels[2]))
            }
            6 => Ok(Self::rgb8(byte(0)?, byte(2)?, byte(4)?)),
            8 => {
                let mut color = Self::rgb8(byte(0)?, byte(2)?, byte(4)?);
                color.a = f32::from(byte(6)?) / 255.0;
                Ok(color)
            }
            n => Err(ColorParseError::BadLength(n)),
        }
    }

    /// Lowercase `#rrggbb`, with an alpha byte appended when not opaque.
    pub fn to_hex(&self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                q(self.r),
                q(self.g),
                q(self.b),
                q(self.a)
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
