use log::debug;

use crate::canvas::Canvas;
use crate::fonts::TextMeasure;
use crate::geometry::{BBox, Point};
use crate::model::{ArrowStroke, Connector, Entity};
use crate::xml::opacity_attr;

use super::text::draw_text;

/// Both ends of every connector stop this far short of their anchor, in
/// points.
const SHRINK: f32 = 2.0;

/// Dash and gap lengths per unit of stroke width.
const DASH: (f32, f32) = (3.7, 1.6);

/// Canvas-space outline of a connector once endpoints, bend and head are
/// resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub start: Point,
    pub control: Point,
    /// Where the shaft meets the head.
    pub base: Point,
    pub tip: Point,
    pub head_left: Point,
    pub head_right: Point,
}

impl ConnectorPath {
    /// Resolves the shaft between two canvas points. `curvature` bends the
    /// shaft to the left of travel as seen on the page.
    pub fn new(from: Point, to: Point, stroke: &ArrowStroke) -> Self {
        let mid = from.midpoint(to);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let control = Point::new(
            mid.x - stroke.curvature * dy,
            mid.y + stroke.curvature * dx,
        );

        let start = from.toward(control, SHRINK);
        let tip = to.toward(control, SHRINK);
        let base = tip.toward(control, stroke.head.length);

        let len = tip.distance(base).max(f32::EPSILON);
        let (ux, uy) = ((tip.x - base.x) / len, (tip.y - base.y) / len);
        let hw = stroke.head.half_width;

        Self {
            start,
            control,
            base,
            tip,
            head_left: base.offset(uy * hw, -ux * hw),
            head_right: base.offset(-uy * hw, ux * hw),
        }
    }

    pub fn is_straight(&self) -> bool {
        let mid = self.start.midpoint(self.tip);
        mid.distance(self.control) < 1e-3
    }

    /// Area covered by shaft and head, using the curve's apex rather than its
    /// control point.
    pub fn bounds(&self) -> BBox {
        let apex = Point::new(
            0.25 * self.start.x + 0.5 * self.control.x + 0.25 * self.tip.x,
            0.25 * self.start.y + 0.5 * self.control.y + 0.25 * self.tip.y,
        );
        [self.tip, self.base, apex, self.head_left, self.head_right]
            .iter()
            .fold(BBox::from_points(self.start, self.start), |acc, p| {
                acc.union(&BBox::from_points(*p, *p))
            })
    }
}

fn render_shaft(path: &ConnectorPath, stroke: &ArrowStroke) -> String {
    let dash_attr = if stroke.dashed {
        format!(
            r#" stroke-dasharray="{:.2},{:.2}""#,
            DASH.0 * stroke.width,
            DASH.1 * stroke.width
        )
    } else {
        String::new()
    };
    let alpha = opacity_attr("stroke-opacity", stroke.alpha);

    if path.is_straight() {
        format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.1}"{}{} />"#,
            path.start.x,
            path.start.y,
            path.base.x,
            path.base.y,
            stroke.color,
            stroke.width,
            dash_attr,
            alpha
        )
    } else {
        format!(
            r#"<path d="M {:.2} {:.2} Q {:.2} {:.2}, {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.1}"{}{} />"#,
            path.start.x,
            path.start.y,
            path.control.x,
            path.control.y,
            path.base.x,
            path.base.y,
            stroke.color,
            stroke.width,
            dash_attr,
            alpha
        )
    }
}

fn render_head(path: &ConnectorPath, stroke: &ArrowStroke) -> String {
    format!(
        r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}"{} />"#,
        path.tip.x,
        path.tip.y,
        path.head_left.x,
        path.head_left.y,
        path.head_right.x,
        path.head_right.y,
        stroke.color,
        opacity_attr("fill-opacity", stroke.alpha)
    )
}

/// Draws `connector` between the two entities its anchors name, then its
/// labels around the midpoint of the unbent chord.
pub fn draw_connector<M: TextMeasure>(
    canvas: &mut Canvas,
    measure: &mut M,
    connector: &Connector,
    from: &Entity,
    to: &Entity,
) {
    debug!(from = from.name.as_str(), to = to.name.as_str(); "Drawing connector");

    let vp = *canvas.viewport();
    let start = connector.from.resolve(from);
    let end = connector.to.resolve(to);

    let path = ConnectorPath::new(vp.to_canvas(start), vp.to_canvas(end), &connector.stroke);
    let mut markup = render_shaft(&path, &connector.stroke);
    markup.push_str(&render_head(&path, &connector.stroke));
    canvas.push(
        &markup,
        path.bounds().with_padding(connector.stroke.width / 2.0),
    );

    let mid = start.midpoint(end);
    for label in &connector.labels {
        let at = vp.to_canvas(mid.offset(label.position.x, label.position.y));
        draw_text(
            canvas,
            measure,
            &label.text,
            at,
            &label.style,
            (label.halign, label.valign),
            label.frame.as_ref(),
        );
    }
}
