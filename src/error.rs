use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between a layout table and the files on disk.
#[derive(Debug, Error)]
pub enum Error {
    #[error("diagram `{diagram}` references unknown entity `{entity}`")]
    UnknownEntity { diagram: String, entity: String },

    #[error("diagram `{diagram}` declares entity `{entity}` more than once")]
    DuplicateEntity { diagram: String, entity: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse generated SVG: {0}")]
    SvgParse(String),

    #[error("failed to allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    PngEncode(String),

    #[error("failed to convert SVG to PDF: {0}")]
    PdfConvert(String),

    #[error("invalid raster resolution: {0} dpi")]
    InvalidDpi(f32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
