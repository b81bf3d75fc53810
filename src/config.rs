//! Serializable library configuration.
//!
//! A [`LibraryConfig`] describes where an icon library lives on disk and
//! which container form it uses. It is the usual way to build an
//! [`OutputFile`].
//!
//! # Example
//!
//! ```
//! use icon_forge::{LibraryConfig, OutputFormat};
//!
//! let config = LibraryConfig::from_json(r#"{
//!     "format": "sprite",
//!     "outputPath": "assets/icons.svg",
//!     "strict": true
//! }"#).unwrap();
//!
//! assert_eq!(config.format, OutputFormat::Sprite);
//! assert_eq!(config.manifest_name, "icons");
//! let file = config.open_output();
//! assert!(file.path().ends_with("icons.svg"));
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::icon::{DEFAULT_VIEW_BOX, IconRecord};
use crate::store::{DEFAULT_MANIFEST_NAME, ModuleStore, OutputFile, OutputStore, SpriteStore};
use crate::variant::VariantLibrary;

/// Container form of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Exported objects plus a manifest.
    #[default]
    Module,
    /// An SVG sprite of `<symbol>` elements.
    Sprite,
}

/// Settings for one icon library.
///
/// # JSON Format
///
/// ```json
/// {
///   "format": "module",
///   "outputPath": "src/icons.ts",
///   "manifestName": "icons",
///   "header": "Generated file.",
///   "defaultViewBox": "0 0 24 24",
///   "strict": false,
///   "variantsPath": "src/icons.variants.json"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LibraryConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Path of the container file.
    pub output_path: PathBuf,

    /// Identifier of the manifest export (module form only).
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Comment written at the top of new module files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Bounding box for records created without one.
    #[serde(default = "default_view_box")]
    pub default_view_box: String,

    /// Fail instead of appending when the manifest or root element is
    /// missing.
    #[serde(default)]
    pub strict: bool,

    /// Where the variant ledger is kept. `None` disables persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants_path: Option<PathBuf>,
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

fn default_view_box() -> String {
    DEFAULT_VIEW_BOX.to_string()
}

impl LibraryConfig {
    /// Creates a module-form config with defaults.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            format: OutputFormat::default(),
            output_path: output_path.into(),
            manifest_name: default_manifest_name(),
            header: None,
            default_view_box: default_view_box(),
            strict: false,
            variants_path: None,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_variants_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.variants_path = Some(path.into());
        self
    }

    /// Builds the store for the configured form.
    pub fn store(&self) -> OutputStore {
        match self.format {
            OutputFormat::Module => {
                let mut store = ModuleStore::new()
                    .with_manifest_name(self.manifest_name.clone())
                    .with_strict(self.strict);
                if let Some(header) = &self.header {
                    store = store.with_header(header.clone());
                }
                store.into()
            }
            OutputFormat::Sprite => SpriteStore::new().with_strict(self.strict).into(),
        }
    }

    /// Binds the configured store to the output path.
    pub fn open_output(&self) -> OutputFile {
        OutputFile::new(self.output_path.clone(), self.store())
    }

    /// Creates a record using the configured default bounding box.
    pub fn record(&self, name: impl Into<String>, body: impl Into<String>) -> IconRecord {
        IconRecord::new(name, body).with_view_box(self.default_view_box.clone())
    }

    /// Loads the variant ledger, or an empty one when persistence is off.
    pub fn load_variants(&self) -> Result<VariantLibrary> {
        match &self.variants_path {
            Some(path) => VariantLibrary::load(path),
            None => Ok(VariantLibrary::new()),
        }
    }

    /// Saves the variant ledger. Does nothing when persistence is off.
    pub fn save_variants(&self, library: &VariantLibrary) -> Result<()> {
        match &self.variants_path {
            Some(path) => library.save(path),
            None => Ok(()),
        }
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
}

// ============================================================================
// Tests
// ============================================================================
