use crate::canvas::Canvas;
use crate::fonts::TextMeasure;
use crate::geometry::{BBox, Point};
use crate::model::{Frame, HAlign, VAlign};
use crate::style::TextStyle;
use crate::xml::{escape_xml, opacity_attr};

/// Stroke width of annotation frames, in points.
const FRAME_STROKE: f32 = 1.0;

/// Draws possibly multi-line text anchored at a canvas point, with an optional
/// rounded frame behind it. Returns the area covered.
pub fn draw_text<M: TextMeasure>(
    canvas: &mut Canvas,
    measure: &mut M,
    text: &str,
    at: Point,
    style: &TextStyle,
    align: (HAlign, VAlign),
    frame: Option<&Frame>,
) -> BBox {
    let (halign, valign) = align;
    let (width, height) = measure.measure_lines(text, style);

    let left = match halign {
        HAlign::Left => at.x,
        HAlign::Center => at.x - width / 2.0,
        HAlign::Right => at.x - width,
    };
    let top = match valign {
        VAlign::Top => at.y,
        VAlign::Center => at.y - height / 2.0,
    };
    let block = BBox::new(left, top, width, height);

    let mut covered = block;
    if let Some(frame) = frame {
        let pad = frame.pad * style.size;
        let rect = block.with_padding(pad);
        canvas.push(
            &format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}"{}{} />"#,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                pad,
                frame.fill,
                frame.edge,
                FRAME_STROKE,
                opacity_attr("fill-opacity", frame.alpha),
                opacity_attr("stroke-opacity", frame.alpha),
            ),
            rect.with_padding(FRAME_STROKE / 2.0),
        );
        covered = covered.union(&rect);
    }

    let anchor = match halign {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let line_height = style.line_height();
    let mut markup = String::new();
    for (i, line) in text.lines().enumerate() {
        let baseline = top + line_height * (i as f32 + 0.5) + style.size / 3.0;
        markup.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" {} text-anchor="{}">{}</text>"#,
            at.x,
            baseline,
            style.svg_attrs(),
            anchor,
            escape_xml(line)
        ));
    }
    canvas.push(&markup, block);

    covered
}
