use std::collections::HashMap;
use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};

use crate::style::TextStyle;

/// Directory of extra fonts picked up next to the working directory.
pub const LOCAL_FONTS_DIR: &str = "fonts";

/// Average glyph advance as a fraction of the font size, used when no real
/// font can shape a string.
const APPROX_ADVANCE: f32 = 0.6;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
    is_italic: bool,
}

/// Measures a single line of text, returning `(width, height)` in points.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> (f32, f32);

    /// Width of the widest line and the stacked height of all lines.
    fn measure_lines(&mut self, text: &str, style: &TextStyle) -> (f32, f32) {
        let mut width: f32 = 0.0;
        let mut lines = 0usize;
        for line in text.lines() {
            width = width.max(self.measure_text(line, style).0);
            lines += 1;
        }
        (width, style.line_height() * lines.max(1) as f32)
    }
}

/// Font-independent estimate. Deterministic, so layout tests do not depend on
/// what is installed on the machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> (f32, f32) {
        let advance = if style.bold {
            APPROX_ADVANCE * 1.1
        } else {
            APPROX_ADVANCE
        };
        (
            text.chars().count() as f32 * style.size * advance,
            style.line_height(),
        )
    }
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: HashMap<MeasureKey, (f32, f32)>,
    fallback: ApproxTextMeasure,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: HashMap::new(),
            fallback: ApproxTextMeasure,
        }
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: style.size.to_bits(),
            is_bold: style.bold,
            is_italic: style.italic,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = style.line_height();
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size: style.size,
                line_height,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new()
            .family(Family::SansSerif)
            .weight(if style.bold {
                Weight::BOLD
            } else {
                Weight::NORMAL
            })
            .style(if style.italic {
                Style::Italic
            } else {
                Style::Normal
            });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let width = buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0_f32, f32::max);

        // No usable face on this machine: fall back to the estimate rather
        // than collapsing every label frame to zero width.
        let measured = if width <= 0.0 && !text.trim().is_empty() {
            log::debug!(text = text; "No font shaped text, using approximate width");
            self.fallback.measure_text(text, style)
        } else {
            (width, line_height)
        };

        self.cache.insert(key, measured);
        measured
    }
}

/// Loads system fonts plus the local `fonts/` directory into a fontdb and picks
/// generic-family fallbacks from whatever faces were found. A macro because
/// resvg and svg2pdf each bring their own `fontdb::Database` type.
macro_rules! load_fonts_with_fallbacks {
    ($fontdb:expr) => {{
        let fontdb = $fontdb;
        fontdb.load_system_fonts();

        let local_fonts = ::std::path::Path::new($crate::fonts::LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        let families: Vec<String> = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
            .collect();
        let picked = $crate::fonts::FallbackFamilies::pick(&families);

        if let Some(family) = picked.sans.as_deref() {
            fontdb.set_sans_serif_family(family);
        }
        if let Some(family) = picked.serif.as_deref() {
            fontdb.set_serif_family(family);
        }
        if let Some(family) = picked.mono.as_deref() {
            fontdb.set_monospace_family(family);
        }
    }};
}

pub(crate) use load_fonts_with_fallbacks;

/// Generic-family fallbacks chosen from the available family names.
#[derive(Debug, Default, PartialEq)]
pub struct FallbackFamilies {
    pub sans: Option<String>,
    pub serif: Option<String>,
    pub mono: Option<String>,
}

impl FallbackFamilies {
    pub fn pick(families: &[String]) -> Self {
        let first = families.first();

        let sans = find_family(families, |f| f.contains("sans") && !f.contains("mono")).or(first);
        let serif = find_family(families, |f| f.contains("serif") && !f.contains("sans")).or(first);
        let mono = find_family(families, |f| f.contains("mono") || f.contains("code")).or(sans);

        Self {
            sans: sans.cloned(),
            serif: serif.cloned(),
            mono: mono.cloned(),
        }
    }
}

fn find_family(families: &[String], pred: impl Fn(&str) -> bool) -> Option<&String> {
    families
        .iter()
        .find(|family| pred(&family.to_ascii_lowercase()))
}

/// True when the local font directory exists, for log output.
pub fn has_local_fonts() -> bool {
    Path::new(LOCAL_FONTS_DIR).is_dir()
}
