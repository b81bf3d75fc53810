//! icon-forge: icon library containers and palette variants
//!
//! This crate keeps a collection of SVG icons in a single container file and
//! edits it one entry at a time without disturbing the rest of the file. It
//! also extracts the colors of an icon and manages named palette variants
//! that can be re-applied to the markup.
//!
//! # Output stores
//!
//! ```
//! use icon_forge::{IconRecord, LibraryConfig};
//! use icon_forge::store::IconStore;
//!
//! let config = LibraryConfig::new("src/icons.ts");
//! let store = config.store();
//!
//! let content = store.create(&IconRecord::new("home", r#"<path d="M0 0"/>"#));
//! let content = store
//!     .upsert(&content, &IconRecord::new("arrow-left", "<path/>"))
//!     .unwrap()
//!     .content;
//!
//! assert!(content.contains("export const arrowLeft = {"));
//! assert_eq!(store.list_names(&content), vec!["home", "arrow-left"]);
//! ```
//!
//! # Colors and variants
//!
//! ```
//! use icon_forge::color::PaletteTransform;
//! use icon_forge::variant::{Selection, VariantSession, VariantSet};
//!
//! let markup = r##"<path fill="#ff0000"/><path stroke="#0000ff"/>"##;
//! let mut session = VariantSession::load("logo", markup, VariantSet::new());
//!
//! let name = session.generate_variant(PaletteTransform::Invert);
//! assert_eq!(name, "Inverted");
//! assert_eq!(session.markup(), r##"<path fill="#00ffff"/><path stroke="#ffff00"/>"##);
//!
//! session.apply(Selection::Original).unwrap();
//! assert_eq!(session.markup(), markup);
//! ```

mod config;
mod error;
mod icon;

pub mod color;
pub mod markup;
pub mod store;
pub mod variant;

pub use config::{LibraryConfig, OutputFormat};
pub use error::{Error, Result};
pub use icon::{Animation, DEFAULT_VIEW_BOX, IconRecord, IconSet, to_identifier};
pub use store::{IconStore, OutputFile, OutputStore, Upsert, UpsertKind};
pub use variant::{VariantLibrary, VariantSession, VariantSet};
