//! Keyed preset schema.

use serde::{Deserialize, Serialize};

use crate::error::{PresetError, ValidationError};
use crate::sequencer::{DurationRange, PhaseKind, RepeatRange, Rgba, Sequencer, PHASE_COUNT};

/// Duration bounds and color of one phase, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    /// Seconds.
    pub min: f64,
    /// Seconds.
    pub max: f64,
    pub color: Rgba,
}

/// Hit count bounds, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCount {
    pub min: u32,
    pub max: u32,
}

/// A named bundle of phase timings and hit count bounds. The name is the
/// key in [`super::PresetStore`].
///
/// Stored values are not trusted: a preset read from disk may have the wrong
/// phase count or inverted bounds. [`Preset::validate`] checks both, and
/// every operation that hands values to a sequencer validates first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub phases: Vec<PhaseSnapshot>,
    pub hit_count: HitCount,
}

/// Validated contents of a preset, ready for [`Sequencer::apply_timings`].
pub type Timings = ([(DurationRange, Rgba); PHASE_COUNT], RepeatRange);

impl Preset {
    /// Capture the current timings and hit count range of a sequencer.
    pub fn from_sequencer(sequencer: &Sequencer) -> Self {
        let range = sequencer.repeat_range();
        Self {
            phases: sequencer
                .phases()
                .iter()
                .map(|p| PhaseSnapshot {
                    min: p.range.min(),
                    max: p.range.max(),
                    color: p.color,
                })
                .collect(),
            hit_count: HitCount {
                min: range.min(),
                max: range.max(),
            },
        }
    }

    /// Check phase count and every bound.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the phase count is wrong, `Validation` with an
    /// `InvalidRange` when any bound is inverted, negative or not finite.
    pub fn validate(&self) -> Result<(), PresetError> {
        self.timings().map(|_| ())
    }

    /// Validate and convert into typed ranges.
    pub fn timings(&self) -> Result<Timings, PresetError> {
        if self.phases.len() != PHASE_COUNT {
            return Err(PresetError::ShapeMismatch {
                expected: PHASE_COUNT,
                actual: self.phases.len(),
            });
        }

        let mut timings = Vec::with_capacity(PHASE_COUNT);
        for (kind, snapshot) in PhaseKind::ALL.into_iter().zip(&self.phases) {
            let field = format!("{} duration", kind.label());
            let range = DurationRange::checked(&field, snapshot.min, snapshot.max)?;
            timings.push((range, snapshot.color));
        }
        let repeat = RepeatRange::new(self.hit_count.min, self.hit_count.max)?;

        let timings = timings.try_into().map_err(|v: Vec<_>| PresetError::ShapeMismatch {
            expected: PHASE_COUNT,
            actual: v.len(),
        })?;
        Ok((timings, repeat))
    }

    /// Copy timings, colors and hit count range into `sequencer`.
    ///
    /// Validation happens before anything is written, so on error the
    /// sequencer is unchanged.
    pub fn apply_to(&self, sequencer: &mut Sequencer) -> Result<(), PresetError> {
        let (timings, repeat) = self.timings()?;
        sequencer.apply_timings(timings, repeat);
        Ok(())
    }

    /// Build a preset from raw user input, rejecting invalid values up front.
    pub fn from_parts(
        durations: &[(f64, f64)],
        colors: &[Rgba],
        hit_count: (u32, u32),
    ) -> Result<Self, PresetError> {
        if durations.len() != colors.len() {
            return Err(ValidationError::InvalidValue {
                field: "colors".into(),
                message: format!("{} durations but {} colors", durations.len(), colors.len()),
            }
            .into());
        }
        let preset = Self {
            phases: durations
                .iter()
                .zip(colors)
                .map(|(&(min, max), &color)| PhaseSnapshot { min, max, color })
                .collect(),
            hit_count: HitCount {
                min: hit_count.0,
                max: hit_count.1,
            },
        };
        preset.validate()?;
        Ok(preset)
    }
}
