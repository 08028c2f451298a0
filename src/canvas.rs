use crate::geometry::{BBox, POINTS_PER_INCH, Viewport};
use crate::style;

/// Padding kept around the drawn content when cropping, in inches.
pub const DEFAULT_TIGHT_PAD_IN: f32 = 0.1;

pub struct Canvas {
    viewport: Viewport,
    body: String,
    extent: Option<BBox>,
}

/// A finished, cropped SVG document. Dimensions are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub svg: String,
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            body: String::new(),
            extent: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Appends markup covering `bounds` on the canvas.
    pub fn push(&mut self, markup: &str, bounds: BBox) {
        self.body.push_str(markup);
        self.body.push('\n');
        self.extent = Some(match self.extent {
            Some(extent) => extent.union(&bounds),
            None => bounds,
        });
    }

    /// Bounding box of everything drawn so far.
    pub fn extent(&self) -> Option<BBox> {
        self.extent
    }

    /// Crops to the drawn content plus `pad_in` inches and wraps the body in
    /// an `<svg>` root on a white background. An empty canvas keeps the full
    /// figure size.
    pub fn finish(self, pad_in: f32) -> SvgDocument {
        let crop = match self.extent {
            Some(extent) => extent.with_padding(pad_in * POINTS_PER_INCH),
            None => BBox::new(0.0, 0.0, self.viewport.width, self.viewport.height),
        };

        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="{x:.2} {y:.2} {w:.2} {h:.2}">
<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{bg}"/>
{body}</svg>
"#,
            x = crop.x,
            y = crop.y,
            w = crop.width,
            h = crop.height,
            bg = style::WHITE,
            body = self.body,
        );

        SvgDocument {
            svg,
            width: crop.width,
            height: crop.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(288.0, 216.0, 10.8, (0.0, 4.0), (0.0, 3.0))
    }

    #[test]
    fn empty_canvas_keeps_figure_size() {
        let doc = Canvas::new(viewport()).finish(DEFAULT_TIGHT_PAD_IN);
        assert_eq!(doc.width, 288.0);
        assert_eq!(doc.height, 216.0);
        assert!(doc.svg.starts_with("<svg"));
    }

    #[test]
    fn finish_crops_to_extent_plus_padding() {
        let mut canvas = Canvas::new(viewport());
        canvas.push("<g/>", BBox::new(50.0, 40.0, 100.0, 20.0));
        canvas.push("<g/>", BBox::new(120.0, 30.0, 60.0, 10.0));
        assert_eq!(canvas.extent(), Some(BBox::new(50.0, 30.0, 130.0, 30.0)));

        let doc = canvas.finish(0.1);
        assert!((doc.width - (130.0 + 14.4)).abs() < 1e-3);
        assert!((doc.height - (30.0 + 14.4)).abs() < 1e-3);
        assert!(doc.svg.contains(r#"viewBox="42.80 22.80 144.40 44.40""#));
    }
}
