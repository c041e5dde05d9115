use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of phases in one cycle.
pub const PHASE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Edging,
    Prepare,
    Hit,
    Hold,
    Release,
}

impl PhaseKind {
    /// All phases in cycle order.
    pub const ALL: [PhaseKind; PHASE_COUNT] = [
        PhaseKind::Edging,
        PhaseKind::Prepare,
        PhaseKind::Hit,
        PhaseKind::Hold,
        PhaseKind::Release,
    ];

    pub fn index(self) -> usize {
        match self {
            PhaseKind::Edging => 0,
            PhaseKind::Prepare => 1,
            PhaseKind::Hit => 2,
            PhaseKind::Hold => 3,
            PhaseKind::Release => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The linear successor, wrapping Release back to Edging.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % PHASE_COUNT]
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Edging => "Edging",
            PhaseKind::Prepare => "Prepare",
            PhaseKind::Hit => "Hit",
            PhaseKind::Hold => "Hold",
            PhaseKind::Release => "Release",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Longest accepted phase, in seconds: the drawn length must fit a `u64`
/// millisecond count.
pub const MAX_DURATION_SECS: f64 = u64::MAX as f64 / 1000.0;

/// Inclusive duration bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationRange {
    min: f64,
    max: f64,
}

impl DurationRange {
    /// Validates `0 <= min <= max <= MAX_DURATION_SECS`.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        Self::checked("duration", min, max)
    }

    pub(crate) fn checked(field: &str, min: f64, max: f64) -> Result<Self, ValidationError> {
        let in_domain = |v: f64| v.is_finite() && (0.0..=MAX_DURATION_SECS).contains(&v);
        if !in_domain(min) || !in_domain(max) || min > max {
            return Err(ValidationError::range(field, min, max));
        }
        Ok(Self { min, max })
    }

    /// For compile-time tables whose bounds are known to be valid.
    pub(crate) const fn from_trusted(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that always yields `secs`.
    pub fn fixed(secs: f64) -> Result<Self, ValidationError> {
        Self::new(secs, secs)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Draw a duration in seconds. See [`random_duration`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        random_duration(self.min, self.max, rng)
    }
}

/// Uniform draw from `[min, max]`; returns `min` exactly when the bounds are equal.
///
/// Callers must pass `min <= max`; [`DurationRange`] guarantees this.
pub fn random_duration<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Inclusive bounds for the number of Hit/Hold/Release passes per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepeatRange {
    min: u32,
    max: u32,
}

impl RepeatRange {
    pub fn new(min: u32, max: u32) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::range("hit count", min, max));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for RepeatRange {
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// Display color. Parsed from `rgba(..)`, `rgb(..)` or `#rrggbb[aa]`,
/// always written as `rgba(r, g, b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidColor(s.to_string());
        let text = s.trim();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let (body, with_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = text.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(invalid());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let a = if with_alpha {
            let a: f32 = parts[3].parse().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(invalid());
            }
            a
        } else {
            1.0
        };

        Ok(Rgba {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 {
        byte(6)? as f32 / 255.0
    } else {
        1.0
    };
    Some(Rgba {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
        a,
    })
}

impl TryFrom<String> for Rgba {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Static description of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseConfig {
    pub kind: PhaseKind,
    /// Label shown while the phase runs and used in status text.
    pub name: String,
    pub range: DurationRange,
    pub color: Rgba,
    pub sound: Option<PathBuf>,
}

impl PhaseConfig {
    pub fn new(kind: PhaseKind, range: DurationRange, color: Rgba) -> Self {
        Self {
            kind,
            name: kind.label().to_string(),
            range,
            color,
            sound: None,
        }
    }

    pub fn with_sound(mut self, sound: Option<PathBuf>) -> Self {
        self.sound = sound;
        self
    }

    /// Draw a duration for this phase, in seconds.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.range.sample(rng)
    }
}
