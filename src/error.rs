//! Error types for icon-forge.
//!
//! Most operations in this crate are total and report "nothing happened" by
//! returning their input unchanged, `None`, or `false`. [`Error`] is reserved
//! for conditions the caller must surface: missing files, a missing manifest
//! in strict mode, container text that is already broken, and variant
//! commands that name something that does not exist.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the output store, output files and the variant ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// The container file does not exist on disk.
    #[error("output file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The aggregate manifest (module form) or the root element (sprite
    /// form) could not be located.
    #[error("manifest `{0}` not found in container")]
    ManifestNotFound(String),

    /// The existing container text is structurally invalid.
    #[error("malformed container at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    /// A variant command named a variant that is not in the set.
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),

    /// The name is reserved for the implicit original palette.
    #[error("variant name `{0}` is reserved")]
    ReservedVariant(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::Malformed { offset, reason }
    }

    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_) | Self::ManifestNotFound(_) | Self::UnknownVariant(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family() {
        assert!(Error::FileNotFound(PathBuf::from("icons.ts")).is_not_found());
        assert!(Error::ManifestNotFound("icons".into()).is_not_found());
        assert!(!Error::malformed(3, "unbalanced braces").is_not_found());
    }

    #[test]
    fn malformed_display_includes_offset() {
        let err = Error::malformed(42, "unterminated string literal");
        assert_eq!(
            err.to_string(),
            "malformed container at byte 42: unterminated string literal"
        );
    }
}
