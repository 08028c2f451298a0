use log::debug;

use crate::canvas::Canvas;
use crate::fonts::TextMeasure;
use crate::geometry::{BBox, Point};
use crate::model::{HAlign, Legend, LegendEntry, VAlign};
use crate::style::{self, TextStyle};
use crate::xml::opacity_attr;

use super::text::draw_text;

// Spacing, in multiples of the legend font size.
const BORDER_PAD: f32 = 0.4;
const BORDER_AXES_PAD: f32 = 0.5;
const LABEL_SPACING: f32 = 0.5;
const COLUMN_SPACING: f32 = 2.0;
const HANDLE_LENGTH: f32 = 2.0;
const HANDLE_HEIGHT: f32 = 0.7;
const HANDLE_TEXT_PAD: f32 = 0.8;

const FRAME_STROKE: f32 = 1.0;
const HANDLE_STROKE: f32 = 1.0;

/// Splits entries into columns, filling each column top to bottom before
/// moving to the next.
pub fn columns(entries: &[LegendEntry], columns: usize) -> Vec<&[LegendEntry]> {
    if entries.is_empty() {
        return Vec::new();
    }
    let rows = entries.len().div_ceil(columns.max(1));
    entries.chunks(rows).collect()
}

/// Draws the legend frame, swatches and labels. The frame's bottom edge is
/// centered on the legend anchor.
pub fn draw_legend<M: TextMeasure>(canvas: &mut Canvas, measure: &mut M, legend: &Legend) {
    let cols = columns(&legend.entries, legend.columns);
    if cols.is_empty() {
        return;
    }
    debug!(entries = legend.entries.len(), columns = cols.len(); "Drawing legend");

    let em = legend.font_size;
    let text_style = TextStyle::new(em);
    let row_height = text_style.line_height().max(HANDLE_HEIGHT * em);
    let rows = cols[0].len();

    let col_widths: Vec<f32> = cols
        .iter()
        .map(|col| {
            let label_width = col
                .iter()
                .map(|entry| measure.measure_text(&entry.label, &text_style).0)
                .fold(0.0_f32, f32::max);
            (HANDLE_LENGTH + HANDLE_TEXT_PAD) * em + label_width
        })
        .collect();

    let content_width =
        col_widths.iter().sum::<f32>() + (cols.len() - 1) as f32 * COLUMN_SPACING * em;
    let content_height = rows as f32 * row_height + (rows - 1) as f32 * LABEL_SPACING * em;
    let frame_width = content_width + 2.0 * BORDER_PAD * em;
    let frame_height = content_height + 2.0 * BORDER_PAD * em;

    let anchor = canvas.viewport().fraction(legend.anchor.0, legend.anchor.1);
    let frame = BBox::new(
        anchor.x - frame_width / 2.0,
        anchor.y - BORDER_AXES_PAD * em - frame_height,
        frame_width,
        frame_height,
    );

    canvas.push(
        &format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}"{}{} />"#,
            frame.x,
            frame.y,
            frame.width,
            frame.height,
            BORDER_PAD * em,
            style::WHITE,
            style::LEGEND_EDGE,
            FRAME_STROKE,
            opacity_attr("fill-opacity", legend.frame_alpha),
            opacity_attr("stroke-opacity", legend.frame_alpha),
        ),
        frame.with_padding(FRAME_STROKE / 2.0),
    );

    let mut col_x = frame.x + BORDER_PAD * em;
    for (col, width) in cols.iter().zip(&col_widths) {
        for (row, entry) in col.iter().enumerate() {
            let row_mid = frame.y
                + BORDER_PAD * em
                + row as f32 * (row_height + LABEL_SPACING * em)
                + row_height / 2.0;

            let handle = BBox::new(
                col_x,
                row_mid - HANDLE_HEIGHT * em / 2.0,
                HANDLE_LENGTH * em,
                HANDLE_HEIGHT * em,
            );
            canvas.push(
                &format!(
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
                    handle.x,
                    handle.y,
                    handle.width,
                    handle.height,
                    entry.fill,
                    style::BLACK,
                    HANDLE_STROKE
                ),
                handle,
            );

            draw_text(
                canvas,
                measure,
                &entry.label,
                Point::new(col_x + (HANDLE_LENGTH + HANDLE_TEXT_PAD) * em, row_mid),
                &text_style,
                (HAlign::Left, VAlign::Center),
                None,
            );
        }
        col_x += width + COLUMN_SPACING * em;
    }
}
