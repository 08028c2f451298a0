/// Font stack used for every text element. DejaVu Sans first so output
/// matches the usual plotting default when it is installed.
pub const FONT_FAMILY: &str = "DejaVu Sans, sans-serif";

/// Line spacing as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;

pub const BLACK: &str = "#000000";
pub const WHITE: &str = "#ffffff";
pub const LIGHT_GRAY: &str = "#d3d3d3";
pub const LEGEND_EDGE: &str = "#cccccc";
pub const MUTED_TEXT: &str = "#666666";

/// System-architecture palette.
pub mod architecture {
    pub const CLIENT: &str = "#E3F2FD";
    pub const FRONTEND: &str = "#BBDEFB";
    pub const BACKEND: &str = "#90CAF9";
    pub const DATABASE: &str = "#64B5F6";
    pub const TEXT: &str = "#1565C0";
    pub const ARROW: &str = "#0D47A1";
    pub const TITLE: &str = "#0D47A1";
    pub const SUBTITLE: &str = "#1976D2";
    pub const NOTE_FILL: &str = "#FFF3E0";
    pub const NOTE_EDGE: &str = "#FF9800";
}

/// Database ERD palette.
pub mod erd {
    pub const CORE: &str = "#E8F5E9";
    pub const AUTH: &str = "#E3F2FD";
    pub const AUDIT: &str = "#FFF3E0";
    pub const CORE_HEADER: &str = "#2E7D32";
    pub const AUTH_HEADER: &str = "#1565C0";
    pub const AUDIT_HEADER: &str = "#EF6C00";
    pub const PRIMARY_KEY: &str = "#4CAF50";
    pub const FOREIGN_KEY: &str = "#2196F3";
    pub const CONSTRAINT: &str = "#FF9800";
    pub const RELATION: &str = "#666666";
    pub const TITLE: &str = "#1B5E20";
    pub const SUBTITLE: &str = "#388E3C";
    pub const NOTE_FILL: &str = "#F5F5F5";
    pub const NOTE_EDGE: &str = "#9E9E9E";
}

/// Font attributes of a text run. Sizes are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            color: BLACK.to_string(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_SPACING
    }

    /// SVG presentation attributes for this style.
    pub fn svg_attrs(&self) -> String {
        let mut attrs = format!(
            r#"font-family="{}" font-size="{:.1}" fill="{}""#,
            FONT_FAMILY, self.size, self.color
        );
        if self.bold {
            attrs.push_str(r#" font-weight="bold""#);
        }
        if self.italic {
            attrs.push_str(r#" font-style="italic""#);
        }
        attrs
    }
}
