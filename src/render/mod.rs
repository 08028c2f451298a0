mod boxes;
mod connector;
mod legend;
mod text;

pub use boxes::draw_entity;
pub use connector::{ConnectorPath, draw_connector};
pub use legend::draw_legend;
pub use text::draw_text;

use log::{debug, info};

use crate::canvas::{Canvas, SvgDocument};
use crate::error::{Error, Result};
use crate::fonts::TextMeasure;
use crate::model::Diagram;

/// Draws every part of `diagram` in a fixed order: boxes, connectors with
/// their labels, free annotations, then the legend on top. The result is
/// cropped to the drawn content plus `pad_in` inches.
pub fn render_diagram<M: TextMeasure>(
    diagram: &Diagram,
    measure: &mut M,
    pad_in: f32,
) -> Result<SvgDocument> {
    diagram.validate()?;

    let viewport = diagram.figure.viewport();
    let mut canvas = Canvas::new(viewport);

    for entity in &diagram.entities {
        draw_entity(&mut canvas, measure, entity, &diagram.label_color);
    }

    for connector in &diagram.connectors {
        let lookup = |name: &str| {
            diagram.entity(name).ok_or_else(|| Error::UnknownEntity {
                diagram: diagram.name.clone(),
                entity: name.to_string(),
            })
        };
        let from = lookup(&connector.from.entity)?;
        let to = lookup(&connector.to.entity)?;
        draw_connector(&mut canvas, measure, connector, from, to);
    }

    for annotation in &diagram.annotations {
        let at = viewport.to_canvas(annotation.position);
        draw_text(
            &mut canvas,
            measure,
            &annotation.text,
            at,
            &annotation.style,
            (annotation.halign, annotation.valign),
            annotation.frame.as_ref(),
        );
    }

    if let Some(legend) = &diagram.legend {
        draw_legend(&mut canvas, measure, legend);
    }

    debug!(diagram = diagram.name.as_str(), extent:? = canvas.extent(); "Canvas complete");

    let document = canvas.finish(pad_in);
    info!(
        diagram = diagram.name.as_str(),
        width = document.width,
        height = document.height;
        "Rendered diagram"
    );
    Ok(document)
}
