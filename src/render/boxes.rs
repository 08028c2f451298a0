use log::debug;

use crate::canvas::Canvas;
use crate::fonts::TextMeasure;
use crate::geometry::{BBox, Point};
use crate::model::{Entity, EntityBody, HAlign, Table, VAlign};
use crate::style::{self, TextStyle};
use crate::xml::opacity_attr;

use super::text::draw_text;

/// Pad around the nominal box, in data units. Also the corner radius.
const BOX_PAD: f32 = 0.1;
const BOX_STROKE: f32 = 2.0;
const LABEL_FONT_SIZE: f32 = 10.0;

const HEADER_HEIGHT: f32 = 0.3;
const HEADER_STROKE: f32 = 1.0;
const HEADER_FONT_SIZE: f32 = 11.0;
const ROW_HEIGHT: f32 = 0.25;
const ROW_INSET: f32 = 0.05;
const ROW_STROKE: f32 = 0.5;
const ROW_ALPHA: f32 = 0.7;
const ROW_TEXT_INSET: f32 = 0.15;
const COLUMN_NAME_FONT_SIZE: f32 = 9.0;
const COLUMN_TYPE_FONT_SIZE: f32 = 8.0;

/// Draws an entity box and whatever its body holds.
pub fn draw_entity<M: TextMeasure>(
    canvas: &mut Canvas,
    measure: &mut M,
    entity: &Entity,
    label_color: &str,
) {
    debug!(entity = entity.name.as_str(); "Drawing entity box");

    draw_rounded_box(canvas, entity);

    match &entity.body {
        EntityBody::Label(label) => {
            let at = canvas.viewport().to_canvas(entity.center);
            draw_text(
                canvas,
                measure,
                label,
                at,
                &TextStyle::new(LABEL_FONT_SIZE).bold().color(label_color),
                (HAlign::Center, VAlign::Center),
                None,
            );
        }
        EntityBody::Table(table) => draw_table(canvas, measure, entity, table),
    }
}

fn draw_rounded_box(canvas: &mut Canvas, entity: &Entity) {
    let vp = *canvas.viewport();
    let lower_left = Point::new(entity.left() - BOX_PAD, entity.bottom() - BOX_PAD);
    let rect = vp.rect(
        lower_left,
        entity.width + 2.0 * BOX_PAD,
        entity.height + 2.0 * BOX_PAD,
    );

    canvas.push(
        &format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" ry="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            BOX_PAD * vp.scale_x(),
            BOX_PAD * vp.scale_y(),
            entity.fill,
            style::BLACK,
            BOX_STROKE
        ),
        rect.with_padding(BOX_STROKE / 2.0),
    );
}

fn plain_rect(rect: &BBox, fill: &str, stroke: &str, stroke_width: f32, alpha: f32) -> String {
    format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}"{}{} />"#,
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        fill,
        stroke,
        stroke_width,
        opacity_attr("fill-opacity", alpha),
        opacity_attr("stroke-opacity", alpha),
    )
}

/// Header bar with the upper-cased title, then one row per column counting
/// down. Rows past the bottom of the box are still drawn.
fn draw_table<M: TextMeasure>(canvas: &mut Canvas, measure: &mut M, entity: &Entity, table: &Table) {
    let vp = *canvas.viewport();

    let header = vp.rect(
        Point::new(entity.left(), entity.top() - HEADER_HEIGHT),
        entity.width,
        HEADER_HEIGHT,
    );
    canvas.push(
        &plain_rect(
            &header,
            table.category.header(),
            style::BLACK,
            HEADER_STROKE,
            1.0,
        ),
        header.with_padding(HEADER_STROKE / 2.0),
    );
    draw_text(
        canvas,
        measure,
        &table.title.to_uppercase(),
        vp.to_canvas(Point::new(entity.center.x, entity.top() - HEADER_HEIGHT / 2.0)),
        &TextStyle::new(HEADER_FONT_SIZE).bold().color(style::WHITE),
        (HAlign::Center, VAlign::Center),
        None,
    );

    // Rows hang below their reference line, which starts one row under the
    // header.
    let first_row_y = entity.top() - HEADER_HEIGHT - ROW_HEIGHT;
    for (i, column) in table.columns.iter().enumerate() {
        let row_y = first_row_y - i as f32 * ROW_HEIGHT;
        let row_mid = row_y - ROW_HEIGHT / 2.0;

        let row = vp.rect(
            Point::new(entity.left() + ROW_INSET, row_y - ROW_HEIGHT + ROW_INSET),
            entity.width - 2.0 * ROW_INSET,
            ROW_HEIGHT - ROW_INSET,
        );
        canvas.push(
            &plain_rect(&row, style::WHITE, style::LIGHT_GRAY, ROW_STROKE, ROW_ALPHA),
            row,
        );

        draw_text(
            canvas,
            measure,
            &format!("{} {}", column.glyph(), column.name),
            vp.to_canvas(Point::new(entity.left() + ROW_TEXT_INSET, row_mid)),
            &TextStyle::new(COLUMN_NAME_FONT_SIZE)
                .bold()
                .color(column.name_color()),
            (HAlign::Left, VAlign::Center),
            None,
        );

        draw_text(
            canvas,
            measure,
            &column.type_text(),
            vp.to_canvas(Point::new(entity.right() - ROW_TEXT_INSET, row_mid)),
            &TextStyle::new(COLUMN_TYPE_FONT_SIZE)
                .italic()
                .color(style::MUTED_TEXT),
            (HAlign::Right, VAlign::Center),
            None,
        );
    }
}
