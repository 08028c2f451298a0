use std::process;

use log::{debug, error, info};

use crate::fonts::CosmicTextMeasure;
use crate::model::Diagram;
use crate::{RenderOptions, run};

/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Renders `diagram` with the default options and exits with status 1 on
/// failure.
pub fn render_or_exit(diagram: &Diagram) {
    let options = RenderOptions::default();
    debug!(options:?; "Render options");

    let mut measure = CosmicTextMeasure::new();
    match run(diagram, &mut measure, &options) {
        Ok(files) => {
            info!(
                diagram = diagram.name.as_str(),
                png:? = files.png,
                pdf:? = files.pdf;
                "Diagram saved"
            );
        }
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    }
}
