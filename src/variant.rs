//! Named color palettes per icon.
//!
//! A [`VariantSet`] is the persisted part: an ordered list of [`Variant`]s
//! and an optional default pointer. A [`VariantSession`] is the in-memory
//! editing state for one icon: the markup being edited, the palette captured
//! when the icon was loaded, and which variant is selected.
//!
//! # Selection
//!
//! ```text
//!   Original (-1) ──edit──▶ fork into "custom" ──▶ Variant(i)
//!        ▲                                           │
//!        └──────── apply(Original) / delete ─────────┘
//! ```
//!
//! Palettes are positional: `colors[i]` pairs with the `i`-th color of
//! [`extract_colors`] on the icon's current markup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{PaletteTransform, normalize_color};
use crate::error::{Error, Result};
use crate::markup::{extract_colors, replace_colors};

/// Name of the implicit, read-only palette captured at load.
pub const ORIGINAL_VARIANT: &str = "original";

/// Name of the variant created on the first edit of the original palette.
pub const CUSTOM_VARIANT: &str = "custom";

// ============================================================================
// Variant / VariantSet
// ============================================================================

/// A named, ordered palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Variant {
    pub name: String,
    pub colors: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, colors: Vec<String>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }
}

/// All saved variants of one icon plus the default pointer.
///
/// Invariant: `default_variant`, when set, names a variant in `variants`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct VariantSet {
    #[serde(default)]
    variants: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_variant: Option<String>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }

    pub fn default_variant(&self) -> Option<&str> {
        self.default_variant.as_deref()
    }

    /// Returns `base`, or `base 2`, `base 3`, ... whichever is free.
    pub fn unique_name(&self, base: &str) -> String {
        if self.get(base).is_none() && base != ORIGINAL_VARIANT {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Saves a new variant and returns the name it was stored under.
    ///
    /// Name collisions get a numeric suffix instead of overwriting.
    pub fn save(&mut self, name: &str, colors: Vec<String>) -> String {
        let name = self.unique_name(name.trim());
        self.variants.push(Variant::new(name.clone(), colors));
        name
    }

    /// Removes a variant. Clears the default pointer if it named it.
    pub fn delete(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        self.variants.remove(index);
        if self.default_variant.as_deref() == Some(name) {
            self.default_variant = None;
        }
        true
    }

    /// Renames a variant, carrying the default pointer along.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<String> {
        let to = to.trim();
        if to == ORIGINAL_VARIANT {
            return Err(Error::ReservedVariant(to.to_string()));
        }
        let index = self
            .position(from)
            .ok_or_else(|| Error::UnknownVariant(from.to_string()))?;
        if from == to {
            return Ok(to.to_string());
        }
        let to = self.unique_name(to);
        self.variants[index].name = to.clone();
        if self.default_variant.as_deref() == Some(from) {
            self.default_variant = Some(to.clone());
        }
        Ok(to)
    }

    /// Sets or clears the default pointer. Does not touch colors.
    pub fn set_default(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.default_variant = None,
            Some(name) if self.get(name).is_some() => {
                self.default_variant = Some(name.to_string());
            }
            Some(name) => return Err(Error::UnknownVariant(name.to_string())),
        }
        Ok(())
    }

    fn get_mut_index(&mut self, index: usize) -> Option<&mut Variant> {
        self.variants.get_mut(index)
    }
}

// ============================================================================
// VariantSession
// ============================================================================

/// Which palette is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// The palette captured at load. Index `-1` in UI terms.
    #[default]
    Original,
    /// Index into the session's variant list.
    Variant(usize),
}

impl Selection {
    /// UI index: `-1` for the original palette.
    pub fn index(self) -> isize {
        match self {
            Self::Original => -1,
            Self::Variant(i) => isize::try_from(i).unwrap_or(isize::MAX),
        }
    }
}

/// Editing state for one icon.
///
/// Construct one per icon per editing session; nothing is shared between
/// sessions.
#[derive(Debug, Clone)]
pub struct VariantSession {
    name: String,
    markup: String,
    original: Vec<String>,
    variants: VariantSet,
    selection: Selection,
}

impl VariantSession {
    /// Starts a session, capturing the current colors as the original
    /// palette. If the set has a default variant it is applied.
    pub fn load(name: impl Into<String>, markup: impl Into<String>, variants: VariantSet) -> Self {
        let markup = markup.into();
        let original = extract_colors(&markup).colors();
        let mut session = Self {
            name: name.into(),
            markup,
            original,
            variants,
            selection: Selection::Original,
        };
        if let Some(index) = session
            .variants
            .default_variant()
            .and_then(|d| session.variants.position(d))
        {
            session.replay(index);
        }
        session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn variants(&self) -> &VariantSet {
        &self.variants
    }

    /// Gives the set back, e.g. for persisting into a [`VariantLibrary`].
    pub fn into_variants(self) -> VariantSet {
        self.variants
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selection_index(&self) -> isize {
        self.selection.index()
    }

    pub fn selected_variant(&self) -> Option<&Variant> {
        match self.selection {
            Selection::Original => None,
            Selection::Variant(i) => self.variants.variants.get(i),
        }
    }

    /// Canonical colors of the current markup, in extraction order.
    pub fn current_colors(&self) -> Vec<String> {
        extract_colors(&self.markup).colors()
    }

    /// Replaces one color in the markup and records it in the selected
    /// variant.
    ///
    /// The original palette is read-only, so an edit while it is selected
    /// first forks into the `custom` variant. Returns false if `old` is not
    /// an editable color present in the markup.
    pub fn edit_color(&mut self, old: &str, new: &str) -> bool {
        let current = self.current_colors();
        let Some(position) =
            normalize_color(old).and_then(|key| current.iter().position(|c| *c == key))
        else {
            return false;
        };
        let Some(new_color) = normalize_color(new) else {
            return false;
        };

        if self.selection == Selection::Original {
            self.fork_custom(&current);
        }

        self.markup = replace_colors(&self.markup, &[(old, new_color.as_str())]);

        // Editing onto a color already present merges two slots.
        let updated = self.current_colors();
        if let Selection::Variant(index) = self.selection {
            if let Some(variant) = self.variants.get_mut_index(index) {
                let merged = updated.len() != current.len();
                variant.colors = updated;
                debug!(
                    icon = %self.name,
                    variant = %variant.name,
                    position,
                    merged,
                    "variant color edited"
                );
            }
        }
        true
    }

    fn fork_custom(&mut self, current: &[String]) {
        let index = match self.variants.position(CUSTOM_VARIANT) {
            Some(index) => {
                self.variants.variants[index].colors = current.to_vec();
                index
            }
            None => {
                self.variants.save(CUSTOM_VARIANT, current.to_vec());
                self.variants.len() - 1
            }
        };
        debug!(icon = %self.name, "forked original palette into custom");
        self.selection = Selection::Variant(index);
    }

    /// Snapshots the current colors as a new variant and selects it.
    pub fn save_variant(&mut self, name: &str) -> Result<String> {
        if name.trim() == ORIGINAL_VARIANT {
            return Err(Error::ReservedVariant(name.trim().to_string()));
        }
        let stored = self.variants.save(name, self.current_colors());
        self.selection = Selection::Variant(self.variants.len() - 1);
        debug!(icon = %self.name, variant = %stored, "variant saved");
        Ok(stored)
    }

    /// Derives a variant from the current colors, saves it and applies it.
    pub fn generate_variant(&mut self, transform: PaletteTransform) -> String {
        let colors = transform.apply(&self.current_colors());
        let stored = self.variants.save(transform.label(), colors);
        let index = self.variants.len() - 1;
        self.replay(index);
        stored
    }

    /// Selects a palette and replays it onto the markup.
    pub fn apply(&mut self, selection: Selection) -> Result<()> {
        match selection {
            Selection::Original => {
                let original = self.original.clone();
                self.replay_colors(&original);
                self.selection = Selection::Original;
            }
            Selection::Variant(index) => {
                if index >= self.variants.len() {
                    return Err(Error::UnknownVariant(format!("#{index}")));
                }
                self.replay(index);
            }
        }
        Ok(())
    }

    /// Selects a palette by name; `original` selects the original palette.
    pub fn apply_named(&mut self, name: &str) -> Result<()> {
        if name == ORIGINAL_VARIANT {
            return self.apply(Selection::Original);
        }
        let index = self
            .variants
            .position(name)
            .ok_or_else(|| Error::UnknownVariant(name.to_string()))?;
        self.apply(Selection::Variant(index))
    }

    fn replay(&mut self, index: usize) {
        let colors = self.variants.variants[index].colors.clone();
        self.replay_colors(&colors);
        self.selection = Selection::Variant(index);
    }

    /// Maps `current[i] -> colors[i]` for the common prefix, in one pass.
    fn replay_colors(&mut self, colors: &[String]) {
        let current = self.current_colors();
        let pairs: Vec<(&str, &str)> = current
            .iter()
            .zip(colors)
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        self.markup = replace_colors(&self.markup, &pairs);
    }

    /// Deletes a variant, fixing up selection and the default pointer.
    pub fn delete_variant(&mut self, name: &str) -> Result<()> {
        if name == ORIGINAL_VARIANT {
            return Err(Error::ReservedVariant(name.to_string()));
        }
        let index = self
            .variants
            .position(name)
            .ok_or_else(|| Error::UnknownVariant(name.to_string()))?;
        self.variants.delete(name);

        self.selection = match self.selection {
            Selection::Variant(selected) if selected == index => Selection::Original,
            Selection::Variant(selected) if selected > index => Selection::Variant(selected - 1),
            other => other,
        };
        debug!(icon = %self.name, variant = %name, "variant deleted");
        Ok(())
    }

    /// Renames a variant; see [`VariantSet::rename`].
    pub fn rename_variant(&mut self, from: &str, to: &str) -> Result<String> {
        self.variants.rename(from, to)
    }

    /// Sets or clears the default variant.
    pub fn set_default(&mut self, name: Option<&str>) -> Result<()> {
        self.variants.set_default(name)
    }
}

// ============================================================================
// VariantLibrary
// ============================================================================

/// Persisted variants for every icon in a library, keyed by icon name.
///
/// # JSON Format
///
/// ```json
/// {
///   "home": {
///     "variants": [{ "name": "Dark", "colors": ["#000000"] }],
///     "defaultVariant": "Dark"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct VariantLibrary {
    icons: BTreeMap<String, VariantSet>,
}

impl VariantLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, icon: &str) -> Option<&VariantSet> {
        self.icons.get(icon)
    }

    pub fn get_mut(&mut self, icon: &str) -> Option<&mut VariantSet> {
        self.icons.get_mut(icon)
    }

    /// Returns the set for `icon`, creating an empty one.
    pub fn entry(&mut self, icon: &str) -> &mut VariantSet {
        self.icons.entry(icon.to_string()).or_default()
    }

    /// Stores a set. Empty sets are dropped so the file stays small.
    pub fn insert(&mut self, icon: impl Into<String>, set: VariantSet) {
        let icon = icon.into();
        if set.is_empty() && set.default_variant().is_none() {
            self.icons.remove(&icon);
        } else {
            self.icons.insert(icon, set);
        }
    }

    /// Starts an editing session for `icon` with its saved variants.
    pub fn session(&self, icon: &str, markup: impl Into<String>) -> VariantSession {
        let set = self.get(icon).cloned().unwrap_or_default();
        VariantSession::load(icon, markup, set)
    }

    /// Writes a finished session back.
    pub fn store_session(&mut self, session: VariantSession) {
        let icon = session.name().to_string();
        self.insert(icon, session.into_variants());
    }

    pub fn remove_icon(&mut self, icon: &str) -> Option<VariantSet> {
        self.icons.remove(icon)
    }

    /// Moves an icon's variants to a new name. Returns false if there were
    /// none.
    pub fn rename_icon(&mut self, from: &str, to: &str) -> bool {
        match self.icons.remove(from) {
            Some(set) => {
                self.icons.insert(to.to_string(), set);
                true
            }
            None => false,
        }
    }

    pub fn icons(&self) -> impl Iterator<Item = &str> {
        self.icons.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a library file; a missing file is an empty library.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::store::file::write_atomic(path, &self.to_json_pretty()?)
    }
}

// ============================================================================
// Tests
// ============================================================================
