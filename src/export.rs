use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::canvas::SvgDocument;
use crate::error::{Error, Result};
use crate::fonts::{self, load_fonts_with_fallbacks};
use crate::geometry::POINTS_PER_INCH;

const METERS_PER_INCH: f32 = 0.0254;

/// Paths written by [`export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub png: PathBuf,
    pub pdf: PathBuf,
}

impl ExportedFiles {
    pub fn new(out_dir: &Path, stem: &str) -> Self {
        Self {
            png: out_dir.join(format!("{stem}.png")),
            pdf: out_dir.join(format!("{stem}.pdf")),
        }
    }
}

/// Rasterizes the document at `dpi`. Canvas units are points, so the scale
/// is `dpi / 72`.
pub fn svg_to_png(document: &SvgDocument, dpi: f32) -> Result<Vec<u8>> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(Error::InvalidDpi(dpi));
    }
    let scale = dpi / POINTS_PER_INCH;

    let mut opts = usvg::Options::default();
    load_fonts_with_fallbacks!(opts.fontdb_mut());

    let tree = usvg::Tree::from_str(&document.svg, &opts)
        .map_err(|e| Error::SvgParse(e.to_string()))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    debug!(width, height, dpi; "Rasterizing");

    let mut pixmap = Pixmap::new(width, height).ok_or(Error::Pixmap { width, height })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    encode_png(&pixmap, dpi)
}

/// Encodes straight RGBA with a `pHYs` chunk, so viewers see the intended DPI.
fn encode_png(pixmap: &Pixmap, dpi: f32) -> Result<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let pixels_per_meter = (dpi / METERS_PER_INCH).round() as u32;
    let encode_err = |e: png::EncodingError| Error::PngEncode(e.to_string());

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: pixels_per_meter,
        yppu: pixels_per_meter,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer.write_image_data(&rgba).map_err(encode_err)?;
    writer.finish().map_err(encode_err)?;

    Ok(out)
}

/// Converts the document to a single-page PDF with text outlined as paths,
/// so the file does not depend on fonts at the reader's end.
pub fn svg_to_pdf(document: &SvgDocument) -> Result<Vec<u8>> {
    let mut fontdb = svg2pdf::usvg::fontdb::Database::new();
    load_fonts_with_fallbacks!(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(&document.svg, &opts)
        .map_err(|e| Error::SvgParse(e.to_string()))?;

    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    let mut pdf = svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::PdfConvert(e.to_string()))?;
    sort_resource_dicts(&mut pdf);
    Ok(pdf)
}

/// Resource subdictionaries that svg2pdf fills from a hash map, so their entry
/// order changes from one process to the next.
const RESOURCE_KINDS: [&[u8]; 6] = [
    b"/ExtGState",
    b"/Pattern",
    b"/Shading",
    b"/XObject",
    b"/Font",
    b"/ColorSpace",
];

/// Sorts the entries of every resource subdictionary made only of indirect
/// references (`/gs3 9 0 R`). Entries are permuted in place between the
/// original separators, so the file length and the xref offsets stay valid.
/// Stream data is skipped.
fn sort_resource_dicts(pdf: &mut [u8]) {
    let mut i = 0;
    while i < pdf.len() {
        if let Some(end) = stream_data_end(pdf, i) {
            i = end;
            continue;
        }

        let kind = RESOURCE_KINDS
            .iter()
            .copied()
            .find(|kind| pdf[i..].starts_with(kind));
        match kind {
            Some(kind) => {
                let after_key = i + kind.len();
                i = sort_reference_dict(pdf, after_key).unwrap_or(after_key);
            }
            None => i += 1,
        }
    }
}

/// If a `stream` keyword starts at `i`, the index just past its `endstream`.
fn stream_data_end(pdf: &[u8], i: usize) -> Option<usize> {
    const KEYWORD: &[u8] = b"stream";
    const END: &[u8] = b"endstream";

    let preceded_by_delimiter = i > 0 && matches!(pdf[i - 1], b'>' | b' ' | b'\n' | b'\r');
    if !preceded_by_delimiter || !pdf[i..].starts_with(KEYWORD) {
        return None;
    }
    if !matches!(pdf.get(i + KEYWORD.len()), Some(b'\n' | b'\r')) {
        return None;
    }

    let data = i + KEYWORD.len();
    let end = pdf[data..]
        .windows(END.len())
        .position(|window| window == END)
        .map_or(pdf.len(), |offset| data + offset + END.len());
    Some(end)
}

/// Sorts the `<< ... >>` dictionary starting at `start` (after whitespace) and
/// returns the index past its closing `>>`. `None` leaves the bytes untouched.
fn sort_reference_dict(pdf: &mut [u8], start: usize) -> Option<usize> {
    let mut pos = skip_whitespace(pdf, start);
    if !pdf[pos..].starts_with(b"<<") {
        return None;
    }
    pos += 2;

    let mut entries: Vec<Range<usize>> = Vec::new();
    loop {
        pos = skip_whitespace(pdf, pos);
        if pdf[pos..].starts_with(b">>") {
            break;
        }
        let end = reference_entry_end(pdf, pos)?;
        entries.push(pos..end);
        pos = end;
    }

    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        let span = first.start..last.end;

        let mut sorted: Vec<&[u8]> = entries.iter().map(|r| &pdf[r.clone()]).collect();
        sorted.sort_unstable();

        let mut rebuilt = Vec::with_capacity(span.len());
        for (n, entry) in sorted.iter().enumerate() {
            rebuilt.extend_from_slice(entry);
            if let Some(next) = entries.get(n + 1) {
                rebuilt.extend_from_slice(&pdf[entries[n].end..next.start]);
            }
        }
        pdf[span].copy_from_slice(&rebuilt);
    }

    Some(pos + 2)
}

/// End of a `/Name <num> <gen> R` entry starting at `pos`.
fn reference_entry_end(pdf: &[u8], pos: usize) -> Option<usize> {
    if pdf.get(pos) != Some(&b'/') {
        return None;
    }
    let mut i = pos + 1;
    let name_start = i;
    while i < pdf.len() && !is_whitespace(pdf[i]) && !b"/<>[]()".contains(&pdf[i]) {
        i += 1;
    }
    if i == name_start {
        return None;
    }

    for _ in 0..2 {
        let after_space = skip_whitespace(pdf, i);
        if after_space == i {
            return None;
        }
        i = after_space;
        let digits_start = i;
        while i < pdf.len() && pdf[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return None;
        }
    }

    let after_space = skip_whitespace(pdf, i);
    if after_space == i || pdf.get(after_space) != Some(&b'R') {
        return None;
    }
    Some(after_space + 1)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\r' | b'\t' | b'\x0c' | b'\0')
}

fn skip_whitespace(pdf: &[u8], mut pos: usize) -> usize {
    while pos < pdf.len() && is_whitespace(pdf[pos]) {
        pos += 1;
    }
    pos
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `<out_dir>/<stem>.png` and `<out_dir>/<stem>.pdf`.
///
/// Both encodings are produced before either file is written. `out_dir` must
/// already exist; a missing directory is reported as [`Error::Write`].
pub fn export(document: &SvgDocument, out_dir: &Path, stem: &str, dpi: f32) -> Result<ExportedFiles> {
    if fonts::has_local_fonts() {
        debug!(dir = fonts::LOCAL_FONTS_DIR; "Loading local fonts");
    }

    let png = svg_to_png(document, dpi)?;
    let pdf = svg_to_pdf(document)?;

    let files = ExportedFiles::new(out_dir, stem);
    write(&files.png, &png)?;
    info!(path:? = files.png, bytes = png.len(); "PNG saved");
    write(&files.pdf, &pdf)?;
    info!(path:? = files.pdf, bytes = pdf.len(); "PDF saved");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::geometry::{BBox, Viewport};

    fn document() -> SvgDocument {
        let mut canvas = Canvas::new(Viewport::new(144.0, 72.0, 0.0, (0.0, 2.0), (0.0, 1.0)));
        canvas.push(
            r##"<rect x="10" y="10" width="50" height="20" fill="#90CAF9" stroke="#000000" />"##,
            BBox::new(10.0, 10.0, 50.0, 20.0),
        );
        canvas.finish(0.1)
    }

    #[test]
    fn png_is_scaled_by_dpi() {
        let doc = document();
        let png = svg_to_png(&doc, 144.0).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));

        // IHDR width/height, big-endian, right after the signature and chunk header.
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        assert_eq!(width, (doc.width * 2.0).ceil() as u32);
        assert_eq!(height, (doc.height * 2.0).ceil() as u32);
    }

    #[test]
    fn png_records_dpi_in_phys_chunk() {
        let png = svg_to_png(&document(), 300.0).unwrap();
        let at = png
            .windows(4)
            .position(|w| w == b"pHYs")
            .expect("pHYs chunk");
        let field = |offset: usize| {
            u32::from_be_bytes(png[at + offset..at + offset + 4].try_into().unwrap())
        };
        assert_eq!(field(4), 11811);
        assert_eq!(field(8), 11811);
        assert_eq!(png[at + 12], 1, "unit is meters");
    }

    #[test]
    fn rejects_non_positive_dpi() {
        assert!(matches!(
            svg_to_png(&document(), 0.0),
            Err(Error::InvalidDpi(_))
        ));
    }

    #[test]
    fn pdf_has_pdf_header() {
        let pdf = svg_to_pdf(&document()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_is_identical_across_conversions() {
        let mut canvas = Canvas::new(Viewport::new(144.0, 72.0, 0.0, (0.0, 2.0), (0.0, 1.0)));
        for (n, alpha) in [0.2, 0.4, 0.6, 0.7, 0.8, 0.9].iter().enumerate() {
            let x = 5.0 + n as f32 * 20.0;
            canvas.push(
                &format!(
                    r##"<rect x="{x}" y="10" width="15" height="15" fill="#FF9800" fill-opacity="{alpha}" stroke="#000000" stroke-opacity="{alpha}" />"##
                ),
                BBox::new(x, 10.0, 15.0, 15.0),
            );
        }
        let doc = canvas.finish(0.1);

        let first = svg_to_pdf(&doc).unwrap();
        for _ in 0..4 {
            assert_eq!(svg_to_pdf(&doc).unwrap(), first);
        }
    }

    const PAGE: &[u8] = b"3 0 obj\n<<\n  /Resources <<\n    /ExtGState <<\n      /gs5 11 0 R\n      /gs3 9 0 R\n      /gs10 16 0 R\n    >>\n  >>\n>>\nendobj\n";
    const PAGE_REORDERED: &[u8] = b"3 0 obj\n<<\n  /Resources <<\n    /ExtGState <<\n      /gs10 16 0 R\n      /gs5 11 0 R\n      /gs3 9 0 R\n    >>\n  >>\n>>\nendobj\n";

    #[test]
    fn resource_entries_are_sorted_in_place() {
        let mut a = PAGE.to_vec();
        let mut b = PAGE_REORDERED.to_vec();
        sort_resource_dicts(&mut a);
        sort_resource_dicts(&mut b);

        assert_eq!(a, b);
        assert_eq!(a.len(), PAGE.len());
        let text = String::from_utf8(a).unwrap();
        assert!(text.contains("/gs10 16 0 R\n      /gs3 9 0 R\n      /gs5 11 0 R\n    >>"));
    }

    #[test]
    fn stream_data_and_inline_dicts_are_left_alone() {
        let stream = b"<< /Length 36 >>\nstream\n/ExtGState << /b 2 0 R /a 1 0 R >>\nendstream\n".to_vec();
        let mut sorted = stream.clone();
        sort_resource_dicts(&mut sorted);
        assert_eq!(sorted, stream);

        let inline = b"/ExtGState << /gs1 << /CA 0.5 >> /gs0 << /CA 0.7 >> >>".to_vec();
        let mut sorted = inline.clone();
        sort_resource_dicts(&mut sorted);
        assert_eq!(sorted, inline);
    }

    #[test]
    fn export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = export(&document(), dir.path(), "sample", 72.0).unwrap();
        assert_eq!(files.png, dir.path().join("sample.png"));
        assert!(std::fs::metadata(&files.png).unwrap().len() > 0);
        assert!(std::fs::metadata(&files.pdf).unwrap().len() > 0);
    }

    #[test]
    fn export_fails_when_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("docs").join("images");
        let err = export(&document(), &missing, "sample", 72.0).unwrap_err();
        assert!(matches!(err, Error::Write { ref path, .. } if path.ends_with("sample.png")));
        assert!(!missing.exists());
    }
}
