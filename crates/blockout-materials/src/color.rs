//! Deterministic color generation: [`ColorParams`], HSV conversion, and
//! seed-driven hue selection.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seeds::SeedTable;

/// Accepted range for [`ColorParams::color_seed`].
pub const COLOR_SEED_RANGE: RangeInclusive<u32> = 1..=1000;

/// Accepted range for [`ColorParams::saturation`] and [`ColorParams::value`].
pub const CHANNEL_RANGE: RangeInclusive<f32> = 0.1..=1.0;

// ---------------------------------------------------------------------------
// ColorParamsError
// ---------------------------------------------------------------------------

/// Errors returned by [`ColorParams::validated`].
#[derive(Debug, Error, PartialEq)]
pub enum ColorParamsError {
    /// Color seed multiplier outside `1..=1000`.
    #[error("color seed {0} is outside 1..=1000")]
    ColorSeedOutOfRange(u32),

    /// Saturation outside `0.1..=1.0` (or NaN).
    #[error("saturation {0} is outside 0.1..=1.0")]
    SaturationOutOfRange(f32),

    /// Value outside `0.1..=1.0` (or NaN).
    #[error("value {0} is outside 0.1..=1.0")]
    ValueOutOfRange(f32),
}

// ---------------------------------------------------------------------------
// ColorParams
// ---------------------------------------------------------------------------

/// Invocation-scoped parameters applied to every color generated in one call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /// Multiplier applied to an identity's stored seed before reseeding.
    /// Changing it shifts every hue while keeping results reproducible.
    pub color_seed: u32,

    /// HSV saturation in `[0.1, 1.0]`.
    pub saturation: f32,

    /// HSV value (brightness) in `[0.1, 1.0]`.
    pub value: f32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            color_seed: 1,
            saturation: 0.65,
            value: 0.5,
        }
    }
}

impl ColorParams {
    /// Rejects parameters outside their accepted domain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ColorParamsError`] found, checking the color seed,
    /// then saturation, then value.
    pub fn validated(self) -> Result<Self, ColorParamsError> {
        if !COLOR_SEED_RANGE.contains(&self.color_seed) {
            return Err(ColorParamsError::ColorSeedOutOfRange(self.color_seed));
        }
        if !CHANNEL_RANGE.contains(&self.saturation) {
            return Err(ColorParamsError::SaturationOutOfRange(self.saturation));
        }
        if !CHANNEL_RANGE.contains(&self.value) {
            return Err(ColorParamsError::ValueOutOfRange(self.value));
        }
        Ok(self)
    }

    /// Clamps every field into its accepted domain. NaN channels fall back
    /// to the defaults.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            color_seed: self
                .color_seed
                .clamp(*COLOR_SEED_RANGE.start(), *COLOR_SEED_RANGE.end()),
            saturation: clamp_channel(self.saturation, defaults.saturation),
            value: clamp_channel(self.value, defaults.value),
        }
    }
}

fn clamp_channel(x: f32, fallback: f32) -> f32 {
    if x.is_nan() {
        fallback
    } else {
        x.clamp(*CHANNEL_RANGE.start(), *CHANNEL_RANGE.end())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates the RGB color for `identity`.
///
/// The identity's seed is looked up in `seeds`, drawing and storing a new one
/// on first sight. The seed is multiplied by `params.color_seed`, a
/// [`ChaCha8Rng`] local to this call is seeded from the product, and its first
/// draw becomes the hue. Out-of-range params are clamped.
pub fn generate(identity: &str, seeds: &mut SeedTable, params: &ColorParams) -> [f32; 3] {
    let seed = seeds.seed_for(identity);
    color_for_seed(seed, &params.clamped())
}

/// Color for an already-known seed. Pure; [`generate`] delegates here.
pub fn color_for_seed(seed: f64, params: &ColorParams) -> [f32; 3] {
    let hue = hue_for_seed(seed * f64::from(params.color_seed));
    hsv_to_rgb(hue, params.saturation, params.value)
}

/// First uniform draw in `[0, 1)` of a generator seeded from `effective_seed`.
///
/// The float's bit pattern is the 64-bit seed, so every distinct product of
/// seed and multiplier maps to its own stream.
pub fn hue_for_seed(effective_seed: f64) -> f32 {
    let mut rng = ChaCha8Rng::seed_from_u64(effective_seed.to_bits());
    rng.random::<f32>()
}

/// Standard HSV to RGB conversion with all inputs and outputs in `[0, 1]`.
///
/// A hue of exactly 1.0 wraps to red, matching a hue of 0.0.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    if s == 0.0 {
        return [v, v, v];
    }

    let scaled = h * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match (sector as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Appends an opaque alpha channel.
pub fn with_alpha(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
