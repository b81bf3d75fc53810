//! Derived-palette transforms.
//!
//! A transform maps an ordered list of colors to a list of the same length
//! and order, so the result can be replayed positionally against the icon
//! it was derived from. Entries that do not parse are passed through
//! unchanged.

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use super::{format_hex, hex_to_rgb, srgb_to_channels};

/// Lightness step used by [`PaletteTransform::Lighten`] and
/// [`PaletteTransform::Darken`].
const LIGHTNESS_STEP: f32 = 0.2;

/// Saturation factor used by [`PaletteTransform::Mute`].
const MUTE_FACTOR: f32 = 0.4;

/// A named whole-palette transform, used to generate automatic variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum PaletteTransform {
    /// Per-channel `255 - c`.
    Invert,
    /// Raises HSL lightness by a fixed step.
    Lighten,
    /// Lowers HSL lightness by a fixed step.
    Darken,
    /// Desaturates in HSL space.
    Mute,
    /// Luma-weighted gray.
    Grayscale,
    /// Rotates the hue by 180 degrees.
    Complementary,
}

impl PaletteTransform {
    /// All transforms, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Invert,
        Self::Lighten,
        Self::Darken,
        Self::Mute,
        Self::Grayscale,
        Self::Complementary,
    ];

    /// Display label, also the base name of generated variants.
    pub fn label(self) -> &'static str {
        match self {
            Self::Invert => "Inverted",
            Self::Lighten => "Light",
            Self::Darken => "Dark",
            Self::Mute => "Muted",
            Self::Grayscale => "Grayscale",
            Self::Complementary => "Complementary",
        }
    }

    /// Applies the transform to every color in order.
    pub fn apply(self, colors: &[String]) -> Vec<String> {
        colors.iter().map(|c| self.apply_one(c)).collect()
    }

    /// Applies the transform to a single color.
    pub fn apply_one(self, color: &str) -> String {
        let Some((r, g, b)) = hex_to_rgb(color) else {
            return color.to_string();
        };
        let (r, g, b) = match self {
            Self::Invert => (255 - r, 255 - g, 255 - b),
            Self::Lighten => shift_lightness((r, g, b), LIGHTNESS_STEP),
            Self::Darken => shift_lightness((r, g, b), -LIGHTNESS_STEP),
            Self::Mute => map_hsl((r, g, b), |hsl| hsl.saturation *= MUTE_FACTOR),
            Self::Grayscale => {
                let gray = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
                let gray = gray.round().clamp(0.0, 255.0) as u8;
                (gray, gray, gray)
            }
            Self::Complementary => map_hsl((r, g, b), |hsl| hsl.hue += 180.0),
        };
        format_hex(r, g, b)
    }
}

/// Raises the HSL lightness of every color by `amount` (0.0-1.0).
pub fn lighten_by(colors: &[String], amount: f32) -> Vec<String> {
    shift_all(colors, amount.clamp(0.0, 1.0))
}

/// Lowers the HSL lightness of every color by `amount` (0.0-1.0).
pub fn darken_by(colors: &[String], amount: f32) -> Vec<String> {
    shift_all(colors, -amount.clamp(0.0, 1.0))
}

fn shift_all(colors: &[String], delta: f32) -> Vec<String> {
    colors
        .iter()
        .map(|color| match hex_to_rgb(color) {
            Some(rgb) => {
                let (r, g, b) = shift_lightness(rgb, delta);
                format_hex(r, g, b)
            }
            None => color.clone(),
        })
        .collect()
}

fn shift_lightness(rgb: (u8, u8, u8), delta: f32) -> (u8, u8, u8) {
    map_hsl(rgb, |hsl| {
        hsl.lightness = (hsl.lightness + delta).clamp(0.0, 1.0);
    })
}

/// Converts to HSL, lets `f` adjust it, and converts back.
fn map_hsl(rgb: (u8, u8, u8), f: impl FnOnce(&mut Hsl)) -> (u8, u8, u8) {
    let (r, g, b) = rgb;
    let srgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let mut hsl: Hsl = srgb.into_color();
    f(&mut hsl);
    let out: Srgb = hsl.into_color();
    srgb_to_channels(out)
}
