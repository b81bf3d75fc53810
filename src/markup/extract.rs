//! Color extraction for the color picker and the variant ledger.

use serde::{Deserialize, Serialize};

use super::occurrences;
use crate::color::{is_current_color, normalize_color};

/// Usage statistics for one unique color in an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ColorSample {
    /// The literal as first encountered in the markup.
    pub color: String,
    /// Canonical `#rrggbb` form, the merge key.
    pub normalized_color: String,
    pub fill_count: usize,
    pub stroke_count: usize,
    /// Always `fill_count + stroke_count`.
    pub total_count: usize,
}

/// The result of scanning one icon's markup.
///
/// Sample order is first-occurrence order in the source text. Variant
/// palettes are positional against this order, so it must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ColorExtraction {
    pub samples: Vec<ColorSample>,
    /// True if any color site uses `currentColor`.
    pub uses_current_color: bool,
}

impl ColorExtraction {
    /// Canonical colors in extraction order.
    pub fn colors(&self) -> Vec<String> {
        self.samples
            .iter()
            .map(|s| s.normalized_color.clone())
            .collect()
    }

    /// Finds the sample for any literal that normalizes to the same color.
    pub fn find(&self, color: &str) -> Option<&ColorSample> {
        let key = normalize_color(color)?;
        self.samples.iter().find(|s| s.normalized_color == key)
    }

    /// Position of a color in extraction order.
    pub fn position(&self, color: &str) -> Option<usize> {
        let key = normalize_color(color)?;
        self.samples.iter().position(|s| s.normalized_color == key)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorSample> {
        self.samples.iter()
    }
}

/// Extracts the editable colors of an icon.
///
/// `none` and `transparent` are skipped. `currentColor` has no fixed value,
/// so it only sets [`ColorExtraction::uses_current_color`].
///
/// ```
/// use icon_forge::markup::extract_colors;
///
/// let found = extract_colors(r##"<path fill="#F00"/><path stroke="red" fill="none"/>"##);
/// assert_eq!(found.samples.len(), 1);
/// assert_eq!(found.samples[0].normalized_color, "#ff0000");
/// assert_eq!(found.samples[0].total_count, 2);
/// ```
pub fn extract_colors(markup: &str) -> ColorExtraction {
    let mut extraction = ColorExtraction::default();

    for occurrence in occurrences(markup) {
        let raw = &markup[occurrence.value];
        if is_current_color(raw) {
            extraction.uses_current_color = true;
            continue;
        }
        let Some(normalized) = normalize_color(raw) else {
            continue;
        };

        let index = match extraction
            .samples
            .iter()
            .position(|s| s.normalized_color == normalized)
        {
            Some(index) => index,
            None => {
                extraction.samples.push(ColorSample {
                    color: raw.to_string(),
                    normalized_color: normalized,
                    fill_count: 0,
                    stroke_count: 0,
                    total_count: 0,
                });
                extraction.samples.len() - 1
            }
        };

        let sample = &mut extraction.samples[index];
        if occurrence.property.is_stroke() {
            sample.stroke_count += 1;
        } else {
            sample.fill_count += 1;
        }
        sample.total_count = sample.fill_count + sample.stroke_count;
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::replace_color;
    use proptest::prelude::*;

    #[test]
    fn merges_by_normalized_value() {
        let markup = r##"<path fill="#FF0000"/><circle stroke="red"/><rect fill="rgb(255,0,0)"/>"##;
        let found = extract_colors(markup);
        assert_eq!(found.len(), 1);
        let sample = &found.samples[0];
        assert_eq!(sample.color, "#FF0000");
        assert_eq!(sample.normalized_color, "#ff0000");
        assert_eq!(sample.fill_count, 2);
        assert_eq!(sample.stroke_count, 1);
        assert_eq!(sample.total_count, 3);
    }

    #[test]
    fn keeps_first_occurrence_order() {
        let markup = r##"<path stroke="#00f"/><path fill="#f00"/><path style="fill:#0f0"/><path fill="#00F"/>"##;
        let found = extract_colors(markup);
        assert_eq!(found.colors(), vec!["#0000ff", "#ff0000", "#00ff00"]);
        assert_eq!(found.position("blue"), Some(0));
        assert_eq!(found.find("lime").unwrap().fill_count, 1);
    }

    #[test]
    fn skips_non_colors_and_flags_current_color() {
        let markup = r##"<path fill="none" stroke="currentColor"/><path fill="transparent"/><path fill="url(#g)"/>"##;
        let found = extract_colors(markup);
        assert!(found.is_empty());
        assert!(found.uses_current_color);
    }

    #[test]
    fn stop_color_counts_as_fill() {
        let markup = r##"<linearGradient><stop stop-color="#123456"/></linearGradient>"##;
        let found = extract_colors(markup);
        assert_eq!(found.samples[0].fill_count, 1);
        assert_eq!(found.samples[0].stroke_count, 0);
    }

    #[test]
    fn sample_json_is_camel_case() {
        let found = extract_colors(r##"<path fill="#abc"/>"##);
        let json = serde_json::to_string(&found).unwrap();
        assert!(json.contains("\"normalizedColor\":\"#aabbcc\""));
        assert!(json.contains("\"usesCurrentColor\":false"));
    }

    fn color_site() -> impl Strategy<Value = String> {
        let attr = prop::sample::select(vec!["fill", "stroke", "stop-color"]);
        let color = prop::sample::select(vec![
            "#f00", "#FF0000", "red", "#00ff00", "blue", "none", "currentColor", "#123",
        ]);
        (attr, color, any::<bool>()).prop_map(|(attr, color, inline)| {
            if inline {
                format!(r#"<path style="{attr}:{color}"/>"#)
            } else {
                format!(r#"<path {attr}="{color}"/>"#)
            }
        })
    }

    proptest! {
        #[test]
        fn replacing_with_self_keeps_counts(sites in prop::collection::vec(color_site(), 1..8)) {
            let markup = sites.concat();
            let before = extract_colors(&markup);
            for sample in &before.samples {
                let after = extract_colors(&replace_color(&markup, &sample.color, &sample.color));
                prop_assert_eq!(
                    after.find(&sample.color).map(|s| s.total_count),
                    Some(sample.total_count)
                );
            }
        }

        #[test]
        fn total_is_fill_plus_stroke(sites in prop::collection::vec(color_site(), 0..8)) {
            let found = extract_colors(&sites.concat());
            for sample in &found.samples {
                prop_assert_eq!(sample.total_count, sample.fill_count + sample.stroke_count);
            }
        }
    }
}
