use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures. Each one aborts the export and selects the exit status.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read input file: {}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no cart items found: neither '{container}' rows nor a '{cart_root}' cart exist in the document")]
    FormatMismatch {
        container: String,
        cart_root: String,
    },

    #[error("no items extracted: all {skipped} cart rows were malformed")]
    NoItemsExtracted { skipped: usize },

    #[error("failed to write spreadsheet: {}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl ExportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } | Self::InputUnreadable { .. } => 2,
            Self::FormatMismatch { .. } | Self::NoItemsExtracted { .. } => 3,
            Self::OutputWrite { .. } => 1,
        }
    }
}
