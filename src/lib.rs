pub mod canvas;
pub mod cli;
pub mod diagrams;
pub mod error;
pub mod export;
pub mod fonts;
pub mod geometry;
pub mod model;
pub mod render;
pub mod style;
pub mod xml;

use std::path::PathBuf;

use log::info;

pub use error::{Error, Result};
pub use export::ExportedFiles;

use fonts::TextMeasure;
use model::Diagram;

/// Directory the images are written to, relative to the working directory.
pub const OUTPUT_DIR: &str = "docs/images";

/// Raster resolution of the PNG output.
pub const DEFAULT_DPI: f32 = 300.0;

/// Where and how diagrams are exported.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    pub dpi: f32,
    /// Padding kept around the drawn content, in inches.
    pub tight_pad_in: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(OUTPUT_DIR),
            dpi: DEFAULT_DPI,
            tight_pad_in: canvas::DEFAULT_TIGHT_PAD_IN,
        }
    }
}

/// Renders `diagram` and writes `<name>.png` and `<name>.pdf` into the
/// output directory, which must already exist.
pub fn run<M: TextMeasure>(
    diagram: &Diagram,
    measure: &mut M,
    options: &RenderOptions,
) -> Result<ExportedFiles> {
    info!(diagram = diagram.name.as_str(); "Rendering");
    let document = render::render_diagram(diagram, measure, options.tight_pad_in)?;
    export::export(&document, &options.output_dir, &diagram.name, options.dpi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ApproxTextMeasure;

    #[test]
    fn default_options_target_docs_images_at_300_dpi() {
        let options = RenderOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("docs/images"));
        assert_eq!(options.dpi, 300.0);
    }

    #[test]
    fn run_writes_architecture_pair() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            output_dir: dir.path().to_path_buf(),
            dpi: 72.0,
            ..RenderOptions::default()
        };
        let files = run(
            &diagrams::architecture::diagram(),
            &mut ApproxTextMeasure,
            &options,
        )
        .unwrap();
        assert_eq!(files.png, dir.path().join("system-architecture.png"));
        assert_eq!(files.pdf, dir.path().join("system-architecture.pdf"));
        assert!(std::fs::metadata(&files.pdf).unwrap().len() > 0);
    }

    #[test]
    fn run_refuses_unknown_entities_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            output_dir: dir.path().to_path_buf(),
            ..RenderOptions::default()
        };
        let mut diagram = diagrams::erd::diagram();
        diagram.connectors[0].to.entity = "user".to_string();

        let err = run(&diagram, &mut ApproxTextMeasure, &options).unwrap_err();
        assert!(matches!(err, Error::UnknownEntity { ref entity, .. } if entity == "user"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
