//! Targeted color substitution.
//!
//! All rewrites are textual and touch only the value bytes of matching color
//! sites. Markup without a match comes back unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{occurrences, splice};
use crate::color::normalize_color;

static SHAPE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(path|circle|rect|ellipse|polygon|polyline)\b([^>]*)>")
        .expect("shape tag pattern is valid")
});

static HAS_FILL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)fill\s*=|(?:^|[\s;"'])fill\s*:"#).expect("fill probe pattern is valid")
});

static FILL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+fill\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("fill attribute pattern is valid")
});

/// Replaces every occurrence of `old` with `new`.
///
/// A site matches when its value normalizes to the same canonical color as
/// `old`, so matching ignores case and notation (`red` matches `#F00`).
/// Keywords such as `none` are never targets.
///
/// ```
/// use icon_forge::markup::replace_color;
///
/// let out = replace_color(r##"<path fill="#F00" stroke="blue"/>"##, "red", "#000000");
/// assert_eq!(out, r##"<path fill="#000000" stroke="blue"/>"##);
/// ```
pub fn replace_color(markup: &str, old: &str, new: &str) -> String {
    replace_colors(markup, &[(old, new)])
}

/// Applies several substitutions in a single pass.
///
/// Each site is matched against the original markup only, so a swap such as
/// `[(red, blue), (blue, red)]` exchanges the two colors instead of
/// collapsing them. When several pairs match a site, the first wins.
pub fn replace_colors<O, N>(markup: &str, pairs: &[(O, N)]) -> String
where
    O: AsRef<str>,
    N: AsRef<str>,
{
    let keys: Vec<(String, &str)> = pairs
        .iter()
        .filter_map(|(old, new)| Some((normalize_color(old.as_ref())?, new.as_ref())))
        .collect();
    if keys.is_empty() {
        return markup.to_string();
    }

    let edits: Vec<_> = occurrences(markup)
        .into_iter()
        .filter_map(|occurrence| {
            let normalized = normalize_color(&markup[occurrence.value.clone()])?;
            keys.iter()
                .find(|(old, _)| *old == normalized)
                .map(|(_, new)| (occurrence.value, new.to_string()))
        })
        .collect();

    if edits.is_empty() {
        return markup.to_string();
    }
    splice(markup, &edits)
}

/// Flattens every editable color to `new`.
///
/// `none`, `transparent`, `currentColor` and non-color values such as
/// gradient references are left alone.
pub fn replace_all_colors(markup: &str, new: &str) -> String {
    let edits: Vec<_> = occurrences(markup)
        .into_iter()
        .filter(|o| normalize_color(&markup[o.value.clone()]).is_some())
        .map(|o| (o.value, new.to_string()))
        .collect();

    if edits.is_empty() {
        return markup.to_string();
    }
    splice(markup, &edits)
}

/// Adds `fill="<color>"` to shape elements that declare no fill.
pub fn add_fill(markup: &str, color: &str) -> String {
    SHAPE_TAG
        .replace_all(markup, |caps: &Captures| {
            let attrs = &caps[2];
            if HAS_FILL.is_match(attrs) {
                caps[0].to_string()
            } else {
                format!(r#"<{} fill="{}"{}>"#, &caps[1], color, attrs)
            }
        })
        .into_owned()
}

/// Strips `fill` attributes, keeping `fill="none"`.
///
/// `fill="none"` controls whether a shape is painted at all, so removing it
/// would change the icon's geometry.
pub fn remove_colors(markup: &str) -> String {
    FILL_ATTR
        .replace_all(markup, |caps: &Captures| {
            let value = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            if value.trim().eq_ignore_ascii_case("none") {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::extract_colors;
    use proptest::prelude::*;

    #[test]
    fn replaces_attributes_and_styles_case_insensitively() {
        let markup = r##"<path fill="#FF0000"/><rect style="stroke: #ff0000; fill:#00f"/>"##;
        let out = replace_color(markup, "#ff0000", "#123456");
        assert_eq!(
            out,
            r##"<path fill="#123456"/><rect style="stroke: #123456; fill:#00f"/>"##
        );
    }

    #[test]
    fn replace_absent_color_is_noop() {
        let markup = r##"<path fill="#00ff00"/>"##;
        assert_eq!(replace_color(markup, "#ff0000", "#000000"), markup);
    }

    #[test]
    fn replace_does_not_touch_other_colors() {
        let markup = r##"<path fill="#f00" stroke="#0f0"/>"##;
        let out = replace_color(markup, "#f00", "#000");
        assert_eq!(out, r##"<path fill="#000" stroke="#0f0"/>"##);
    }

    #[test]
    fn simultaneous_swap_does_not_cascade() {
        let markup = r##"<path fill="red"/><path fill="blue"/>"##;
        let out = replace_colors(markup, &[("red", "blue"), ("blue", "red")]);
        assert_eq!(out, r##"<path fill="blue"/><path fill="red"/>"##);
    }

    #[test]
    fn replace_all_flattens_editable_colors() {
        let markup = r##"<path fill="red" stroke="none"/><path stroke="#0f0" fill="currentColor"/>"##;
        let out = replace_all_colors(markup, "#333333");
        assert_eq!(
            out,
            r##"<path fill="#333333" stroke="none"/><path stroke="#333333" fill="currentColor"/>"##
        );
    }

    #[test]
    fn add_fill_only_where_missing() {
        let markup = r##"<g><path d="M0 0"/><circle fill="red" r="1"/><rect style="fill:blue"/></g>"##;
        let out = add_fill(markup, "#000000");
        assert_eq!(
            out,
            r##"<g><path fill="#000000" d="M0 0"/><circle fill="red" r="1"/><rect style="fill:blue"/></g>"##
        );
    }

    #[test]
    fn remove_colors_keeps_fill_none() {
        let markup = r##"<path fill="#f00" d="M0"/><path fill="none" stroke="#000"/><rect fill='blue'/>"##;
        let out = remove_colors(markup);
        assert_eq!(
            out,
            r##"<path d="M0"/><path fill="none" stroke="#000"/><rect/>"##
        );
    }

    #[test]
    fn keywords_are_never_replaced() {
        let markup = r##"<path fill="none" stroke="currentColor"/>"##;
        assert_eq!(replace_color(markup, "none", "#000000"), markup);
        assert_eq!(replace_color(markup, "currentColor", "#000000"), markup);
    }

    proptest! {
        #[test]
        fn replacing_absent_color_is_identity(
            body in "[a-z <>=\"#0-9/]{0,40}",
        ) {
            let markup = format!(r##"<path fill="#00ff00"/>{body}"##);
            let absent = "#abcdef";
            prop_assume!(extract_colors(&markup).find(absent).is_none());
            prop_assert_eq!(replace_color(&markup, absent, "#000000"), markup);
        }
    }
}
