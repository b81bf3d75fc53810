//! Color model: parsing, canonicalization and contrast math.
//!
//! Every color that flows through the extractor and the variant ledger is
//! reduced to a *canonical color*: a lower-case `#rrggbb` string. Tokens
//! that do not denote a fixed color (`none`, `transparent`, `currentColor`,
//! `url(#gradient)`, garbage) canonicalize to `None`, which callers treat as
//! "not an editable color".

pub mod transform;

pub use transform::{PaletteTransform, darken_by, lighten_by};

use palette::{LinSrgb, Srgb};

/// Converts a color literal to its canonical `#rrggbb` form.
///
/// Accepted inputs:
/// - `#rgb` and `#rrggbb` hex (any case); `#rgba` and `#rrggbbaa` drop alpha
/// - CSS named colors (`red`, `RebeccaPurple`, ...)
/// - `rgb()` / `rgba()`; channels are truncated to integers, alpha is ignored
/// - `hsl()` / `hsla()` and the other CSS color functions; alpha is ignored
///
/// ```
/// use icon_forge::color::normalize_color;
///
/// assert_eq!(normalize_color("#ABC").as_deref(), Some("#aabbcc"));
/// assert_eq!(normalize_color("rgb(255,0,0)").as_deref(), Some("#ff0000"));
/// assert_eq!(normalize_color("none"), None);
/// ```
pub fn normalize_color(input: &str) -> Option<String> {
    let value = input.trim();
    if value.is_empty() || is_non_color_keyword(value) {
        return None;
    }

    if let Some(hex) = value.strip_prefix('#') {
        if let Some((r, g, b)) = parse_hex(hex) {
            return Some(format_hex(r, g, b));
        }
    } else if value.bytes().all(|b| b.is_ascii_hexdigit()) {
        // Bare words such as `bad` or `face` are not hex colors in markup.
        return None;
    }

    let color = csscolorparser::parse(value).ok()?;
    Some(format_hex(
        unit_to_channel(color.r),
        unit_to_channel(color.g),
        unit_to_channel(color.b),
    ))
}

/// Returns true for `none`, `transparent` and `currentColor` in any case.
pub fn is_non_color_keyword(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("transparent")
        || value.eq_ignore_ascii_case("currentcolor")
}

/// Returns true if `value` is `currentColor` in any case.
pub fn is_current_color(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("currentcolor")
}

/// Formats channels as `#rrggbb`, rounding and clamping each to `[0, 255]`.
///
/// Derived palettes do arithmetic on channels, so out-of-range input is
/// expected here and must never produce an invalid hex string.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    format_hex(clamp_channel(r), clamp_channel(g), clamp_channel(b))
}

/// Parses any accepted color literal into its RGB channels.
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let canonical = normalize_color(color)?;
    parse_hex(&canonical[1..])
}

/// Relative luminance of an sRGB color in `[0, 1]`.
///
/// Each channel is linearized with the sRGB transfer function and weighted
/// with the BT.709 coefficients.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear: LinSrgb<f64> = Srgb::new(r, g, b).into_format::<f64>().into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// Contrast ratio between two colors, in `[1, 21]`.
///
/// Returns `1.0` when either color cannot be parsed.
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    let (Some((ar, ag, ab)), Some((br, bg, bb))) = (hex_to_rgb(a), hex_to_rgb(b)) else {
        return 1.0;
    };
    let la = luminance(ar, ag, ab);
    let lb = luminance(br, bg, bb);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Picks black or white, whichever contrasts more with `background`.
///
/// Unparseable backgrounds get black.
pub fn readable_foreground(background: &str) -> &'static str {
    if contrast_ratio(background, "#000000") >= contrast_ratio(background, "#ffffff") {
        "#000000"
    } else {
        "#ffffff"
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

pub(crate) fn format_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some((digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some((pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

/// Maps a `[0, 1]` channel to a byte, truncating like `rgb()` does.
fn unit_to_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value * 255.0).trunc().clamp(0.0, 255.0) as u8
}

pub(crate) fn srgb_to_channels(rgb: Srgb) -> (u8, u8, u8) {
    (
        clamp_channel(f64::from(rgb.red) * 255.0),
        clamp_channel(f64::from(rgb.green) * 255.0),
        clamp_channel(f64::from(rgb.blue) * 255.0),
    )
}

// ============================================================================
// Tests
// ============================================================================
